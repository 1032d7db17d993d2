use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    dto::{format_system_time, validation::validate_player_tag},
    state::cup::{RosterSlot, Team, TeamStatus},
};

/// One roster slot in a registration or edit payload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RosterSlotInput {
    /// In-game player tag (`#` + uppercase alphanumerics).
    pub tag: String,
    /// Optional town-hall hint; overridden when the identity resolver knows better.
    pub town_hall: Option<u8>,
}

impl Validate for RosterSlotInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_player_tag(self.tag.trim()) {
            errors.add("tag", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload submitted to register a team into a cup.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterTeamRequest {
    /// Team name, unique within the cup.
    pub name: String,
    /// Captain tag; must be one of the roster tags.
    pub captain_tag: String,
    /// Roster; must match the cup format's roster size exactly.
    pub roster: Vec<RosterSlotInput>,
}

impl Validate for RegisterTeamRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.name.trim().is_empty() {
            let mut err = ValidationError::new("name_empty");
            err.message = Some("team name must not be empty".into());
            errors.add("name", err);
        }
        if self.name.len() > 32 {
            let mut err = ValidationError::new("name_length");
            err.message = Some("team name must be at most 32 characters".into());
            errors.add("name", err);
        }
        if let Err(e) = validate_player_tag(self.captain_tag.trim()) {
            errors.add("captain_tag", e);
        }
        for slot in &self.roster {
            errors.merge_self("roster", slot.validate());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload replacing a team's roster.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EditRosterRequest {
    /// New roster; must match the cup format's roster size exactly.
    pub roster: Vec<RosterSlotInput>,
    /// New captain tag; must be one of the new roster tags.
    pub captain_tag: String,
}

impl Validate for EditRosterRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_player_tag(self.captain_tag.trim()) {
            errors.add("captain_tag", e);
        }
        for slot in &self.roster {
            errors.merge_self("roster", slot.validate());
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Roster slot representation returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RosterSlotDto {
    /// Player tag.
    pub tag: String,
    /// Resolved display name.
    pub name: String,
    /// Town-hall level, when known.
    pub town_hall: Option<u8>,
}

impl From<RosterSlot> for RosterSlotDto {
    fn from(value: RosterSlot) -> Self {
        Self {
            tag: value.tag,
            name: value.name,
            town_hall: value.town_hall,
        }
    }
}

/// Team representation returned by the API and carried in SSE events.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamSummary {
    /// Team name.
    pub name: String,
    /// Captain tag.
    pub captain_tag: String,
    /// Captain display name.
    pub captain_name: String,
    /// Roster slots.
    pub roster: Vec<RosterSlotDto>,
    /// Whether the team has been knocked out.
    pub eliminated: bool,
    /// Approval status (`pending` or `active`).
    pub status: String,
    /// RFC 3339 registration timestamp.
    pub registered_at: String,
}

impl From<Team> for TeamSummary {
    fn from(value: Team) -> Self {
        Self {
            name: value.name,
            captain_tag: value.captain_tag,
            captain_name: value.captain_name,
            roster: value.roster.into_iter().map(Into::into).collect(),
            eliminated: value.eliminated,
            status: match value.status {
                TeamStatus::Pending => "pending".to_owned(),
                TeamStatus::Active => "active".to_owned(),
            },
            registered_at: format_system_time(value.registered_at),
        }
    }
}
