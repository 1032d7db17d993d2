//! Bracket progression engine: the state machine advancing matches, rounds
//! and brackets across the supported tournament formats.

pub mod double_elim;
pub mod page_playoff;
pub mod resolver;
pub mod round_robin;
pub mod single_elim;
pub mod standings;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::cup::{Match, Team};

/// How survivors are paired when a knockout round is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SeedingPolicy {
    /// Pair teams in standings order (1v2, 3v4, ...).
    Sequential,
    /// Shuffle survivors before pairing.
    Random,
}

/// Tournament format strategy, selected once per stage of a cup.
///
/// Every variant implements the same three operations so callers never branch
/// on the format outside this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BracketStrategy {
    /// All-play-all league stage generated up front via the circle method.
    RoundRobin {
        /// Number of times each pair meets (1 = single, 2 = double round-robin).
        legs: u8,
    },
    /// Pairwise knockout, one round at a time.
    SingleElimination {
        /// Pairing discipline between rounds.
        seeding: SeedingPolicy,
    },
    /// Final-four "double chance" bracket: Q1, E1, SF, GF.
    PagePlayoff,
    /// Four-team upper/lower bracket with a grand final.
    DoubleElimination,
}

/// Read-only view of one stage handed to the strategy operations.
#[derive(Debug)]
pub struct StageContext<'a> {
    /// Index of the stage within the cup format.
    pub stage: usize,
    /// First round number available to this stage.
    pub round_base: u32,
    /// Approved, not-yet-eliminated teams entering the stage.
    pub entrants: &'a [Team],
    /// Entrant names in ranking order (standings of the previous stage, or
    /// registration order for an opening stage).
    pub seeds: &'a [String],
    /// Matches already generated for this stage.
    pub matches: &'a [Match],
}

/// Batch of matches produced by a generation step.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundPlan {
    /// First round number of the generated batch.
    pub round: u32,
    /// Newly created matches (possibly spanning several rounds).
    pub matches: Vec<Match>,
}

/// Consequences of a match completing: downstream nodes to create, teams
/// knocked out, and whether a round just finished.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Advancement {
    /// Matches to create; callers must skip any id that already exists so
    /// duplicate completion events stay idempotent.
    pub new_matches: Vec<Match>,
    /// Teams to flag as eliminated.
    pub eliminated: Vec<String>,
    /// Round that became fully completed with this result, if any.
    pub completed_round: Option<u32>,
}

/// Errors raised by generation steps when their preconditions are unmet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressionError {
    /// A round (or a drawn match inside it) still blocks the next step.
    #[error("round {round} is not complete yet")]
    PrerequisiteNotMet {
        /// The blocking round.
        round: u32,
    },
    /// The requested round or bracket was already generated.
    #[error("{what} already generated")]
    AlreadyExists {
        /// What exists already ("round 3", "page playoff bracket", ...).
        what: String,
    },
    /// Too few teams remain for the requested stage.
    #[error("not enough participants: need {needed}, have {got}")]
    InsufficientParticipants {
        /// Minimum required.
        needed: usize,
        /// Teams actually available.
        got: usize,
    },
}

impl BracketStrategy {
    /// Generate the next round (or the whole bracket, for formats drawn up
    /// front) for this stage.
    pub fn generate_next(&self, ctx: &StageContext<'_>) -> Result<RoundPlan, ProgressionError> {
        match self {
            BracketStrategy::RoundRobin { legs } => round_robin::generate(ctx, *legs),
            BracketStrategy::SingleElimination { seeding } => {
                single_elim::generate(ctx, *seeding)
            }
            BracketStrategy::PagePlayoff => page_playoff::generate(ctx),
            BracketStrategy::DoubleElimination => double_elim::generate(ctx),
        }
    }

    /// React to a completed match: compute downstream node creations and
    /// eliminations. Must be idempotent and order-independent; `ctx.matches`
    /// already reflects the completed result.
    pub fn on_match_completed(&self, ctx: &StageContext<'_>, completed: &Match) -> Advancement {
        match self {
            BracketStrategy::RoundRobin { .. } => round_robin::on_match_completed(ctx, completed),
            BracketStrategy::SingleElimination { .. } => {
                single_elim::on_match_completed(ctx, completed)
            }
            BracketStrategy::PagePlayoff => page_playoff::on_match_completed(ctx, completed),
            BracketStrategy::DoubleElimination => double_elim::on_match_completed(ctx, completed),
        }
    }

    /// Whether this stage has nothing left to play or generate, so the next
    /// stage of the cup may start.
    pub fn stage_exhausted(&self, ctx: &StageContext<'_>) -> bool {
        match self {
            BracketStrategy::RoundRobin { .. } => round_robin::exhausted(ctx),
            BracketStrategy::SingleElimination { .. } => single_elim::exhausted(ctx),
            BracketStrategy::PagePlayoff => page_playoff::exhausted(ctx),
            BracketStrategy::DoubleElimination => double_elim::exhausted(ctx),
        }
    }

    /// Minimum number of entrants the stage needs to start.
    pub fn min_entrants(&self) -> usize {
        match self {
            BracketStrategy::RoundRobin { .. } | BracketStrategy::SingleElimination { .. } => 2,
            BracketStrategy::PagePlayoff | BracketStrategy::DoubleElimination => 4,
        }
    }
}

/// Whether every match of `round` within the slice is completed.
pub(crate) fn round_complete(matches: &[Match], round: u32) -> bool {
    let mut any = false;
    for m in matches.iter().filter(|m| m.round == round) {
        any = true;
        if !m.completed {
            return false;
        }
    }
    any
}

/// Look up a match by slot id.
pub(crate) fn find_match<'a>(matches: &'a [Match], id: &str) -> Option<&'a Match> {
    matches.iter().find(|m| m.id == id)
}

/// `completed_round` helper: the completed match's round, when it just became
/// fully played.
pub(crate) fn completed_round_marker(ctx: &StageContext<'_>, completed: &Match) -> Option<u32> {
    round_complete(ctx.matches, completed.round).then_some(completed.round)
}
