//! Page playoff: a fixed four-node bracket over the top four standings
//! entries. The top seed gets two chances before elimination.
//!
//! `Q1` = rank 1 v rank 2, `E1` = rank 3 v rank 4,
//! `SF` = loser(Q1) v winner(E1), `GF` = winner(Q1) v winner(SF).

use crate::engine::{
    Advancement, ProgressionError, RoundPlan, StageContext, completed_round_marker, find_match,
};
use crate::state::cup::{BracketGroup, Match};

/// Qualifier slot id (rank 1 v rank 2; winner goes straight to the final).
pub const Q1: &str = "PP_Q1";
/// Eliminator slot id (rank 3 v rank 4; loser is out).
pub const E1: &str = "PP_E1";
/// Semi-final slot id (loser of Q1 v winner of E1).
pub const SF: &str = "PP_SF";
/// Grand final slot id.
pub const GF: &str = "PP_GF";

/// Seed the qualifier and eliminator from the top four seeds.
pub(crate) fn generate(ctx: &StageContext<'_>) -> Result<RoundPlan, ProgressionError> {
    if !ctx.matches.is_empty() {
        return Err(ProgressionError::AlreadyExists {
            what: "page playoff bracket".to_owned(),
        });
    }
    if ctx.seeds.len() < 4 {
        return Err(ProgressionError::InsufficientParticipants {
            needed: 4,
            got: ctx.seeds.len(),
        });
    }

    let round = ctx.round_base;
    let matches = vec![
        node(
            Q1,
            "Qualifier 1 (1st vs 2nd)",
            round,
            ctx.stage,
            &ctx.seeds[0],
            &ctx.seeds[1],
        ),
        node(
            E1,
            "Eliminator 1 (3rd vs 4th)",
            round,
            ctx.stage,
            &ctx.seeds[2],
            &ctx.seeds[3],
        ),
    ];

    Ok(RoundPlan { round, matches })
}

/// Advance the bracket. Node creation is guarded on absence, so re-delivered
/// completion events and feeders finishing in either order never duplicate a
/// downstream match.
pub(crate) fn on_match_completed(ctx: &StageContext<'_>, completed: &Match) -> Advancement {
    let q1 = find_match(ctx.matches, Q1);
    let e1 = find_match(ctx.matches, E1);
    let sf = find_match(ctx.matches, SF);
    let gf = find_match(ctx.matches, GF);

    let mut adv = Advancement::default();

    // The eliminator, semi-final and grand final all knock their loser out.
    if matches!(completed.id.as_str(), E1 | SF | GF)
        && let Some(loser) = completed.loser_name()
    {
        adv.eliminated.push(loser.to_owned());
    }

    if sf.is_none()
        && let (Some(q1), Some(e1)) = (q1, e1)
        && q1.completed
        && e1.completed
        && let (Some(q1_loser), Some(e1_winner)) = (q1.loser_name(), e1.winner_name())
    {
        adv.new_matches.push(node(
            SF,
            "Semi-Final (Loser Q1 vs Winner E1)",
            completed.round,
            ctx.stage,
            q1_loser,
            e1_winner,
        ));
    }

    if gf.is_none()
        && let (Some(q1), Some(sf)) = (q1, sf)
        && sf.completed
        && let (Some(q1_winner), Some(sf_winner)) = (q1.winner_name(), sf.winner_name())
    {
        adv.new_matches.push(node(
            GF,
            "Grand Final",
            completed.round,
            ctx.stage,
            q1_winner,
            sf_winner,
        ));
    }

    adv.completed_round = completed_round_marker(ctx, completed);
    adv
}

/// The bracket ends with a decisive grand final.
pub(crate) fn exhausted(ctx: &StageContext<'_>) -> bool {
    find_match(ctx.matches, GF)
        .map(|gf| gf.completed && gf.winner_name().is_some())
        .unwrap_or(false)
}

fn node(id: &str, label: &str, round: u32, stage: usize, team1: &str, team2: &str) -> Match {
    Match::new(
        id,
        label,
        round,
        stage,
        Some(BracketGroup::PagePlayoff),
        team1,
        team2,
    )
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::state::cup::{Outcome, Team, TeamStatus};

    fn entrants() -> Vec<Team> {
        ["First", "Second", "Third", "Fourth"]
            .iter()
            .map(|name| Team {
                name: (*name).into(),
                captain_tag: "#CAP".into(),
                captain_name: "Captain".into(),
                roster: Vec::new(),
                eliminated: false,
                status: TeamStatus::Active,
                registered_at: SystemTime::UNIX_EPOCH,
            })
            .collect()
    }

    fn seeds() -> Vec<String> {
        vec![
            "First".into(),
            "Second".into(),
            "Third".into(),
            "Fourth".into(),
        ]
    }

    fn ctx<'a>(entrants: &'a [Team], seeds: &'a [String], matches: &'a [Match]) -> StageContext<'a> {
        StageContext {
            stage: 1,
            round_base: 8,
            entrants,
            seeds,
            matches,
        }
    }

    fn decide(matches: &mut [Match], id: &str, winner: &str) {
        let m = matches.iter_mut().find(|m| m.id == id).unwrap();
        m.completed = true;
        m.outcome = Some(Outcome::Winner(winner.into()));
    }

    #[test]
    fn seeding_creates_qualifier_and_eliminator() {
        let teams = entrants();
        let seeds = seeds();
        let plan = generate(&ctx(&teams, &seeds, &[])).unwrap();

        assert_eq!(plan.matches.len(), 2);
        let q1 = &plan.matches[0];
        assert_eq!(q1.id, Q1);
        assert_eq!((q1.team1.as_str(), q1.team2.as_str()), ("First", "Second"));
        let e1 = &plan.matches[1];
        assert_eq!(e1.id, E1);
        assert_eq!((e1.team1.as_str(), e1.team2.as_str()), ("Third", "Fourth"));
        assert!(plan.matches.iter().all(|m| m.round == 8));
    }

    #[test]
    fn semi_final_waits_for_both_feeders() {
        let teams = entrants();
        let seeds = seeds();
        let mut matches = generate(&ctx(&teams, &seeds, &[])).unwrap().matches;

        decide(&mut matches, Q1, "First");
        let q1 = matches[0].clone();
        let adv = on_match_completed(&ctx(&teams, &seeds, &matches), &q1);
        assert!(adv.new_matches.is_empty(), "SF needs E1 as well");

        decide(&mut matches, E1, "Third");
        let e1 = matches[1].clone();
        let adv = on_match_completed(&ctx(&teams, &seeds, &matches), &e1);
        assert_eq!(adv.new_matches.len(), 1);
        let sf = &adv.new_matches[0];
        assert_eq!(sf.id, SF);
        assert_eq!((sf.team1.as_str(), sf.team2.as_str()), ("Second", "Third"));
        assert_eq!(adv.eliminated, vec!["Fourth".to_owned()]);
    }

    #[test]
    fn redelivered_completion_creates_no_duplicate_semi_final() {
        let teams = entrants();
        let seeds = seeds();
        let mut matches = generate(&ctx(&teams, &seeds, &[])).unwrap().matches;
        decide(&mut matches, Q1, "First");
        decide(&mut matches, E1, "Third");

        let e1 = matches[1].clone();
        let adv = on_match_completed(&ctx(&teams, &seeds, &matches), &e1);
        matches.extend(adv.new_matches);

        // Same completion event delivered a second time.
        let replay = on_match_completed(&ctx(&teams, &seeds, &matches), &e1);
        assert!(replay.new_matches.is_empty());
    }

    #[test]
    fn grand_final_pairs_qualifier_winner_with_semi_final_winner() {
        let teams = entrants();
        let seeds = seeds();
        let mut matches = generate(&ctx(&teams, &seeds, &[])).unwrap().matches;
        decide(&mut matches, Q1, "First");
        decide(&mut matches, E1, "Third");

        let e1 = matches[1].clone();
        let adv = on_match_completed(&ctx(&teams, &seeds, &matches), &e1);
        matches.extend(adv.new_matches);

        decide(&mut matches, SF, "Second");
        let sf = matches.iter().find(|m| m.id == SF).unwrap().clone();
        let adv = on_match_completed(&ctx(&teams, &seeds, &matches), &sf);
        assert_eq!(adv.eliminated, vec!["Third".to_owned()]);
        assert_eq!(adv.new_matches.len(), 1);
        let gf = &adv.new_matches[0];
        assert_eq!(gf.id, GF);
        assert_eq!((gf.team1.as_str(), gf.team2.as_str()), ("First", "Second"));

        matches.extend(adv.new_matches);
        assert!(!exhausted(&ctx(&teams, &seeds, &matches)));
        decide(&mut matches, GF, "First");
        assert!(exhausted(&ctx(&teams, &seeds, &matches)));
    }

    #[test]
    fn fewer_than_four_seeds_is_rejected() {
        let teams = entrants();
        let seeds: Vec<String> = vec!["First".into(), "Second".into(), "Third".into()];
        let err = generate(&ctx(&teams, &seeds, &[])).unwrap_err();
        assert_eq!(
            err,
            ProgressionError::InsufficientParticipants { needed: 4, got: 3 }
        );
    }

    #[test]
    fn reseeding_an_existing_bracket_is_rejected() {
        let teams = entrants();
        let seeds = seeds();
        let matches = generate(&ctx(&teams, &seeds, &[])).unwrap().matches;
        let err = generate(&ctx(&teams, &seeds, &matches)).unwrap_err();
        assert!(matches!(err, ProgressionError::AlreadyExists { .. }));
    }
}
