//! Typed broadcast helpers feeding the live leaderboard and bracket boards.
//!
//! These are notifications only: nothing in the engine's control flow depends
//! on a subscriber being connected.

use tracing::warn;

use crate::{
    dto::{
        matches::MatchSummary,
        sse::{
            BracketAdvancedEvent, CupResetEvent, MatchFinalizedEvent, MatchReopenedEvent,
            RoundCompleteEvent, RoundGeneratedEvent, ServerEvent, SystemStatus, TeamCreatedEvent,
            TeamDeletedEvent, TeamUpdatedEvent,
        },
        team::TeamSummary,
    },
    state::SharedState,
};

const EVENT_ROUND_GENERATED: &str = "round.generated";
const EVENT_MATCH_FINALIZED: &str = "match.finalized";
const EVENT_MATCH_REOPENED: &str = "match.reopened";
const EVENT_BRACKET_ADVANCED: &str = "bracket.advanced";
const EVENT_ROUND_COMPLETE: &str = "round.complete";
const EVENT_CUP_RESET: &str = "cup.reset";
const EVENT_TEAM_CREATED: &str = "team.created";
const EVENT_TEAM_UPDATED: &str = "team.updated";
const EVENT_TEAM_DELETED: &str = "team.deleted";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast that a round (or pre-drawn schedule) has been generated.
pub fn broadcast_round_generated(state: &SharedState, cup: &str, round: u32, matches: &[MatchSummary]) {
    let payload = RoundGeneratedEvent {
        cup: cup.to_owned(),
        round,
        matches: matches.to_vec(),
    };
    send_public_event(state, EVENT_ROUND_GENERATED, &payload);
}

/// Broadcast a finalized match result.
pub fn broadcast_match_finalized(state: &SharedState, summary: MatchSummary) {
    let payload = MatchFinalizedEvent(summary);
    send_public_event(state, EVENT_MATCH_FINALIZED, &payload);
}

/// Broadcast that a completed result was reopened for editing.
pub fn broadcast_match_reopened(state: &SharedState, summary: MatchSummary) {
    let payload = MatchReopenedEvent(summary);
    send_public_event(state, EVENT_MATCH_REOPENED, &payload);
}

/// Broadcast bracket nodes created by the progression engine.
pub fn broadcast_bracket_advanced(state: &SharedState, cup: &str, matches: &[MatchSummary]) {
    let payload = BracketAdvancedEvent {
        cup: cup.to_owned(),
        matches: matches.to_vec(),
    };
    send_public_event(state, EVENT_BRACKET_ADVANCED, &payload);
}

/// Broadcast that every match of a round has completed.
pub fn broadcast_round_complete(state: &SharedState, cup: &str, round: u32) {
    let payload = RoundCompleteEvent {
        cup: cup.to_owned(),
        round,
    };
    send_public_event(state, EVENT_ROUND_COMPLETE, &payload);
}

/// Broadcast that a cup was reset and its boards should clear.
pub fn broadcast_cup_reset(state: &SharedState, cup: &str) {
    let payload = CupResetEvent {
        cup: cup.to_owned(),
    };
    send_public_event(state, EVENT_CUP_RESET, &payload);
}

/// Broadcast the registration of a new team to public and staff boards.
pub fn broadcast_team_created(state: &SharedState, team: TeamSummary) {
    let payload = TeamCreatedEvent { team };
    send_public_event(state, EVENT_TEAM_CREATED, &payload);
    send_admin_event(state, EVENT_TEAM_CREATED, &payload);
}

/// Broadcast a team update (approval, roster edit, elimination).
pub fn broadcast_team_updated(state: &SharedState, team: TeamSummary) {
    let payload = TeamUpdatedEvent { team };
    send_public_event(state, EVENT_TEAM_UPDATED, &payload);
}

/// Broadcast that a team has been deleted or rejected.
pub fn broadcast_team_deleted(state: &SharedState, team: &str) {
    let payload = TeamDeletedEvent {
        team: team.to_owned(),
    };
    send_public_event(state, EVENT_TEAM_DELETED, &payload);
}

/// Broadcast a degraded-mode flip to every subscriber.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    let payload = SystemStatus { degraded };
    send_public_event(state, EVENT_SYSTEM_STATUS, &payload);
    send_admin_event(state, EVENT_SYSTEM_STATUS, &payload);
}

fn send_public_event<T: serde::Serialize>(state: &SharedState, event: &str, payload: &T) {
    match ServerEvent::json(Some(event.to_owned()), payload) {
        Ok(event) => state.public_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize public event"),
    }
}

fn send_admin_event<T: serde::Serialize>(state: &SharedState, event: &str, payload: &T) {
    match ServerEvent::json(Some(event.to_owned()), payload) {
        Ok(event) => state.admin_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize admin event"),
    }
}
