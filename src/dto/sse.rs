use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::{matches::MatchSummary, team::TeamSummary};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// Optional SSE event name.
    pub event: Option<String>,
    /// Serialized data field.
    pub data: String,
}

impl ServerEvent {
    /// Build an event from an already-serialized data payload.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Token refresh payload sent to a newly connected admin stream.
pub struct AdminHandshake {
    /// Token the admin client must present on privileged calls.
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    /// Current degraded flag.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a round (or a whole pre-drawn schedule) has been generated.
pub struct RoundGeneratedEvent {
    /// Cup slug.
    pub cup: String,
    /// First round number of the batch.
    pub round: u32,
    /// The matches created.
    pub matches: Vec<MatchSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast whenever a match result is finalized.
pub struct MatchFinalizedEvent(pub MatchSummary);

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast when a completed result is reopened for editing.
pub struct MatchReopenedEvent(pub MatchSummary);

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the engine creates downstream bracket nodes.
pub struct BracketAdvancedEvent {
    /// Cup slug.
    pub cup: String,
    /// Newly created matches.
    pub matches: Vec<MatchSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when every match of a round has been completed.
pub struct RoundCompleteEvent {
    /// Cup slug.
    pub cup: String,
    /// The completed round.
    pub round: u32,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a cup's matches are wiped by a tournament reset.
pub struct CupResetEvent {
    /// Cup slug.
    pub cup: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Event emitted when a new team is registered.
pub struct TeamCreatedEvent {
    /// The registered team.
    pub team: TeamSummary,
}

#[derive(Debug, Serialize, ToSchema)]
/// Event emitted when an existing team was updated (approval, roster, elimination).
pub struct TeamUpdatedEvent {
    /// The updated team.
    pub team: TeamSummary,
}

#[derive(Debug, Serialize, ToSchema)]
/// Event emitted when a team has been deleted or its application rejected.
pub struct TeamDeletedEvent {
    /// Name of the removed team.
    pub team: String,
}
