//! Round-robin generation via the circle method: fix the first entrant,
//! rotate the rest, pad odd fields with a bye that never reaches storage.

use crate::engine::{
    Advancement, ProgressionError, RoundPlan, StageContext, completed_round_marker,
};
use crate::state::cup::Match;

/// Internal padding entrant for odd fields; dropped from generated matches.
const BYE: &str = "BYE";

/// Pre-generate every round of the league in one batch.
///
/// `legs` is the number of meetings per pair; the second leg mirrors the
/// first with home and away swapped.
pub(crate) fn generate(ctx: &StageContext<'_>, legs: u8) -> Result<RoundPlan, ProgressionError> {
    if !ctx.matches.is_empty() {
        // Completeness gate: with unplayed matches the caller is asking to
        // move on too early; with everything played the schedule simply
        // cannot be drawn twice.
        if let Some(blocking) = ctx
            .matches
            .iter()
            .filter(|m| !m.completed)
            .map(|m| m.round)
            .min()
        {
            return Err(ProgressionError::PrerequisiteNotMet { round: blocking });
        }
        return Err(ProgressionError::AlreadyExists {
            what: "round robin schedule".to_owned(),
        });
    }
    if ctx.entrants.len() < 2 {
        return Err(ProgressionError::InsufficientParticipants {
            needed: 2,
            got: ctx.entrants.len(),
        });
    }

    let mut names: Vec<String> = ctx.entrants.iter().map(|team| team.name.clone()).collect();
    if names.len() % 2 != 0 {
        names.push(BYE.to_owned());
    }

    let rounds_per_leg = (names.len() - 1) as u32;
    let pairs_per_round = names.len() / 2;

    let fixed = names[0].clone();
    let mut rotating: Vec<String> = names[1..].to_vec();

    let mut matches = Vec::new();
    for leg in 0..legs {
        for r in 0..rounds_per_leg {
            let round = ctx.round_base + u32::from(leg) * rounds_per_leg + r;
            let mut pairings: Vec<(String, String)> =
                vec![(fixed.clone(), rotating[rotating.len() - 1].clone())];
            for i in 0..pairs_per_round - 1 {
                pairings.push((rotating[i].clone(), rotating[rotating.len() - 2 - i].clone()));
            }

            let mut slot = 0;
            for (home, away) in pairings {
                if home == BYE || away == BYE {
                    continue;
                }
                slot += 1;
                let (team1, team2) = if leg % 2 == 0 {
                    (home, away)
                } else {
                    (away, home)
                };
                matches.push(Match::new(
                    format!("R{round}_M{slot}"),
                    format!("Round {round} - Match {slot}"),
                    round,
                    ctx.stage,
                    None,
                    team1,
                    team2,
                ));
            }

            rotating.rotate_right(1);
        }
    }

    Ok(RoundPlan {
        round: ctx.round_base,
        matches,
    })
}

/// League matches feed no downstream nodes; only round completion is tracked.
pub(crate) fn on_match_completed(ctx: &StageContext<'_>, completed: &Match) -> Advancement {
    Advancement {
        completed_round: completed_round_marker(ctx, completed),
        ..Advancement::default()
    }
}

/// The league is done once its schedule exists and every match is completed.
pub(crate) fn exhausted(ctx: &StageContext<'_>) -> bool {
    !ctx.matches.is_empty() && ctx.matches.iter().all(|m| m.completed)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::SystemTime;

    use super::*;
    use crate::state::cup::{Team, TeamStatus};

    fn teams(count: usize) -> Vec<Team> {
        (0..count)
            .map(|i| Team {
                name: format!("Team {i}"),
                captain_tag: format!("#C{i}"),
                captain_name: format!("Captain {i}"),
                roster: Vec::new(),
                eliminated: false,
                status: TeamStatus::Active,
                registered_at: SystemTime::UNIX_EPOCH,
            })
            .collect()
    }

    fn ctx<'a>(entrants: &'a [Team], matches: &'a [Match]) -> StageContext<'a> {
        StageContext {
            stage: 0,
            round_base: 1,
            entrants,
            seeds: &[],
            matches,
        }
    }

    #[test]
    fn eight_teams_yield_seven_rounds_of_four() {
        let entrants = teams(8);
        let plan = generate(&ctx(&entrants, &[]), 1).unwrap();

        assert_eq!(plan.matches.len(), 28);
        for round in 1..=7 {
            assert_eq!(
                plan.matches.iter().filter(|m| m.round == round).count(),
                4,
                "round {round}"
            );
        }

        // Every unordered pair appears exactly once.
        let mut pairs = HashSet::new();
        for m in &plan.matches {
            let mut pair = [m.team1.clone(), m.team2.clone()];
            pair.sort();
            assert!(pairs.insert(pair), "{} vs {} repeated", m.team1, m.team2);
        }
        assert_eq!(pairs.len(), 28);
    }

    #[test]
    fn odd_field_absorbs_the_bye() {
        let entrants = teams(5);
        let plan = generate(&ctx(&entrants, &[]), 1).unwrap();

        // 5 teams pad to 6: five rounds of two real matches each.
        assert_eq!(plan.matches.len(), 10);
        assert_eq!(
            plan.matches.iter().map(|m| m.round).max(),
            Some(5),
            "five rounds"
        );
        assert!(
            plan.matches
                .iter()
                .all(|m| m.team1 != BYE && m.team2 != BYE),
            "bye never persisted"
        );
    }

    #[test]
    fn double_round_robin_mirrors_each_pairing() {
        let entrants = teams(4);
        let plan = generate(&ctx(&entrants, &[]), 2).unwrap();

        assert_eq!(plan.matches.len(), 12);
        assert_eq!(plan.matches.iter().map(|m| m.round).max(), Some(6));

        let first_leg: HashSet<(String, String)> = plan
            .matches
            .iter()
            .filter(|m| m.round <= 3)
            .map(|m| (m.team1.clone(), m.team2.clone()))
            .collect();
        for m in plan.matches.iter().filter(|m| m.round > 3) {
            assert!(
                first_leg.contains(&(m.team2.clone(), m.team1.clone())),
                "leg two should mirror {} vs {}",
                m.team1,
                m.team2
            );
        }
    }

    #[test]
    fn unfinished_schedule_blocks_with_the_first_open_round() {
        let entrants = teams(4);
        let mut matches = generate(&ctx(&entrants, &[]), 1).unwrap().matches;
        for m in matches.iter_mut().filter(|m| m.round == 1) {
            m.completed = true;
            m.outcome = Some(crate::state::cup::Outcome::Tie);
        }

        let err = generate(&ctx(&entrants, &matches), 1).unwrap_err();
        assert_eq!(err, ProgressionError::PrerequisiteNotMet { round: 2 });
    }

    #[test]
    fn regeneration_of_a_finished_schedule_is_rejected() {
        let entrants = teams(4);
        let mut matches = generate(&ctx(&entrants, &[]), 1).unwrap().matches;
        for m in matches.iter_mut() {
            m.completed = true;
            m.outcome = Some(crate::state::cup::Outcome::Tie);
        }

        let err = generate(&ctx(&entrants, &matches), 1).unwrap_err();
        assert!(matches!(err, ProgressionError::AlreadyExists { .. }));
    }

    #[test]
    fn one_team_is_not_a_league() {
        let entrants = teams(1);
        let err = generate(&ctx(&entrants, &[]), 1).unwrap_err();
        assert_eq!(
            err,
            ProgressionError::InsufficientParticipants { needed: 2, got: 1 }
        );
    }

    #[test]
    fn round_completion_is_reported_once_all_matches_finish() {
        let entrants = teams(4);
        let mut matches = generate(&ctx(&entrants, &[]), 1).unwrap().matches;

        for i in 0..matches.len() {
            matches[i].completed = true;
            matches[i].outcome = Some(crate::state::cup::Outcome::Winner(
                matches[i].team1.clone(),
            ));
        }

        let completed = matches[1].clone();
        let adv = on_match_completed(&ctx(&entrants, &matches), &completed);
        assert_eq!(adv.completed_round, Some(completed.round));
        assert!(adv.new_matches.is_empty());
        assert!(adv.eliminated.is_empty());
    }
}
