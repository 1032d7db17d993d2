use thiserror::Error;

use crate::state::cup::Match;

/// Lifecycle phase of a single match node in a bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    /// One or both team slots still hold the placeholder.
    PendingTeams,
    /// Both teams known, no stats recorded yet.
    Ready,
    /// At least one side's stats recorded, result not declared.
    StatsPartial,
    /// Winner (or tie) declared; terminal under normal flow.
    Completed,
}

/// Which side of a match an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The `team1` slot.
    Team1,
    /// The `team2` slot.
    Team2,
}

/// Events that drive a match through its phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEvent {
    /// A side's per-player stats were recorded.
    StatsEntered(Side),
    /// Both sides resolved into a final result.
    Finalized,
    /// A completed result was reopened for editing.
    Reopened,
}

/// Error returned when an event cannot be applied in the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// Phase the match was in when the event arrived.
    pub from: MatchPhase,
    /// The rejected event.
    pub event: MatchEvent,
}

impl MatchPhase {
    /// Derive the phase from a match record.
    pub fn of(m: &Match) -> Self {
        if !m.has_teams() {
            MatchPhase::PendingTeams
        } else if m.completed {
            MatchPhase::Completed
        } else if m.team1_stats.is_empty() && m.team2_stats.is_empty() {
            MatchPhase::Ready
        } else {
            MatchPhase::StatsPartial
        }
    }

    /// Compute the phase after applying `event`, rejecting invalid transitions.
    ///
    /// Finalizing an already-completed match is *not* routed through here:
    /// callers absorb duplicate finalize triggers as no-ops before consulting
    /// the machine.
    pub fn apply(self, event: MatchEvent) -> Result<MatchPhase, InvalidTransition> {
        let next = match (self, event) {
            (MatchPhase::Ready, MatchEvent::StatsEntered(_)) => MatchPhase::StatsPartial,
            (MatchPhase::StatsPartial, MatchEvent::StatsEntered(_)) => MatchPhase::StatsPartial,
            (MatchPhase::StatsPartial, MatchEvent::Finalized) => MatchPhase::Completed,
            (MatchPhase::Completed, MatchEvent::Reopened) => MatchPhase::StatsPartial,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::cup::{Match, StatLine, TBD};

    fn line(tag: &str) -> StatLine {
        StatLine {
            tag: tag.into(),
            name: "Player".into(),
            stars: 2,
            percent: 80.0,
        }
    }

    #[test]
    fn phase_derivation_follows_record_shape() {
        let mut m = Match::new("R1_M1", "Round 1 - Match 1", 1, 0, None, "Alpha", TBD);
        assert_eq!(MatchPhase::of(&m), MatchPhase::PendingTeams);

        m.team2 = "Bravo".into();
        assert_eq!(MatchPhase::of(&m), MatchPhase::Ready);

        m.team1_stats = vec![line("#AAA")];
        assert_eq!(MatchPhase::of(&m), MatchPhase::StatsPartial);

        m.completed = true;
        assert_eq!(MatchPhase::of(&m), MatchPhase::Completed);
    }

    #[test]
    fn happy_path_to_completion() {
        let phase = MatchPhase::Ready;
        let phase = phase.apply(MatchEvent::StatsEntered(Side::Team1)).unwrap();
        let phase = phase.apply(MatchEvent::StatsEntered(Side::Team2)).unwrap();
        assert_eq!(phase, MatchPhase::StatsPartial);
        assert_eq!(
            phase.apply(MatchEvent::Finalized).unwrap(),
            MatchPhase::Completed
        );
    }

    #[test]
    fn reopen_returns_to_partial() {
        let phase = MatchPhase::Completed;
        assert_eq!(
            phase.apply(MatchEvent::Reopened).unwrap(),
            MatchPhase::StatsPartial
        );
    }

    #[test]
    fn stats_cannot_be_entered_before_teams_resolve() {
        let err = MatchPhase::PendingTeams
            .apply(MatchEvent::StatsEntered(Side::Team1))
            .unwrap_err();
        assert_eq!(err.from, MatchPhase::PendingTeams);
    }

    #[test]
    fn finalize_requires_recorded_stats() {
        let err = MatchPhase::Ready.apply(MatchEvent::Finalized).unwrap_err();
        assert_eq!(err.from, MatchPhase::Ready);
        assert_eq!(err.event, MatchEvent::Finalized);
    }
}
