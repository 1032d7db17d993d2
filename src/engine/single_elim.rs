//! Single elimination: rounds are drawn one at a time once the previous
//! round is fully decided; losers drop out, winners re-pair.

use rand::seq::SliceRandom;

use crate::engine::{
    Advancement, ProgressionError, RoundPlan, SeedingPolicy, StageContext, completed_round_marker,
    round_complete,
};
use crate::state::cup::Match;

/// Draw the next knockout round.
///
/// The opening round pairs all entrants; later rounds pair the survivors of
/// the previous round. Pairing follows the configured seeding policy. With an
/// odd survivor count the first team in pairing order receives a bye (no
/// match is persisted for it).
pub(crate) fn generate(
    ctx: &StageContext<'_>,
    seeding: SeedingPolicy,
) -> Result<RoundPlan, ProgressionError> {
    let (round, mut field) = if ctx.matches.is_empty() {
        (ctx.round_base, ordered_entrants(ctx))
    } else {
        let last_round = ctx
            .matches
            .iter()
            .map(|m| m.round)
            .max()
            .unwrap_or(ctx.round_base);
        if !round_complete(ctx.matches, last_round) {
            return Err(ProgressionError::PrerequisiteNotMet { round: last_round });
        }
        // A drawn knockout match leaves both sides alive and blocks the next
        // round until it is edited to a decisive result.
        if ctx
            .matches
            .iter()
            .any(|m| m.round == last_round && m.winner_name().is_none())
        {
            return Err(ProgressionError::PrerequisiteNotMet { round: last_round });
        }

        (last_round + 1, survivors(ctx, last_round))
    };

    if field.len() < 2 {
        return Err(ProgressionError::InsufficientParticipants {
            needed: 2,
            got: field.len(),
        });
    }

    if seeding == SeedingPolicy::Random {
        field.shuffle(&mut rand::rng());
    }

    // Odd field: the head of the pairing order sits the round out.
    let byes = field.len() % 2;
    let paired = &field[byes..];

    let matches = paired
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| {
            let slot = i + 1;
            Match::new(
                format!("R{round}_M{slot}"),
                format!("Round {round} - Match {slot}"),
                round,
                ctx.stage,
                None,
                pair[0].clone(),
                pair[1].clone(),
            )
        })
        .collect();

    Ok(RoundPlan { round, matches })
}

/// Knock the decisive loser out; report round completion.
pub(crate) fn on_match_completed(ctx: &StageContext<'_>, completed: &Match) -> Advancement {
    let eliminated = completed
        .loser_name()
        .map(|loser| vec![loser.to_owned()])
        .unwrap_or_default();

    Advancement {
        new_matches: Vec::new(),
        eliminated,
        completed_round: completed_round_marker(ctx, completed),
    }
}

/// Exhausted once a played final leaves a single survivor.
pub(crate) fn exhausted(ctx: &StageContext<'_>) -> bool {
    if ctx.matches.is_empty() || !ctx.matches.iter().all(|m| m.completed) {
        return false;
    }
    let last_round = ctx.matches.iter().map(|m| m.round).max().unwrap_or(0);
    let finalists: Vec<&Match> = ctx
        .matches
        .iter()
        .filter(|m| m.round == last_round)
        .collect();
    finalists.len() == 1 && finalists[0].winner_name().is_some()
}

/// Entrants in pairing order: seeded order when seeds are known, otherwise
/// registration order.
fn ordered_entrants(ctx: &StageContext<'_>) -> Vec<String> {
    if ctx.seeds.is_empty() {
        ctx.entrants.iter().map(|team| team.name.clone()).collect()
    } else {
        ctx.seeds
            .iter()
            .filter(|seed| ctx.entrants.iter().any(|team| &team.name == *seed))
            .cloned()
            .collect()
    }
}

/// Survivors of `round` in pairing order: its winners plus any entrant that
/// sat the round out on a bye.
fn survivors(ctx: &StageContext<'_>, round: u32) -> Vec<String> {
    ordered_entrants(ctx)
        .into_iter()
        .filter(|name| {
            let played = ctx
                .matches
                .iter()
                .find(|m| m.round == round && m.involves(name));
            match played {
                Some(m) => m.winner_name() == Some(name.as_str()),
                None => true,
            }
        })
        .collect()
}
