use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::config::FormatSpec;

/// Persisted tournament instance, keyed by slug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CupEntity {
    /// URL-safe unique identifier.
    pub slug: String,
    /// Display name of the cup.
    pub name: String,
    /// Format selected at creation.
    pub format: FormatSpec,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
}

/// Approval status stored with a team.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TeamStatusEntity {
    /// Registered but waiting for staff approval.
    Pending,
    /// Approved and eligible for draws.
    Active,
}

/// One roster slot stored with a team.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RosterSlotEntity {
    /// In-game player tag.
    pub tag: String,
    /// Display name resolved at registration time.
    pub name: String,
    /// Town-hall level, when known.
    pub town_hall: Option<u8>,
}

/// Representation of a team stored in persistence and shared across layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamEntity {
    /// Slug of the cup this team belongs to.
    pub cup: String,
    /// Team name, unique within the cup.
    pub name: String,
    /// Tag of the captain.
    pub captain_tag: String,
    /// Captain display name.
    pub captain_name: String,
    /// Fixed-size roster.
    pub roster: Vec<RosterSlotEntity>,
    /// Whether the engine knocked this team out of an elimination bracket.
    pub eliminated: bool,
    /// Approval status.
    pub status: TeamStatusEntity,
    /// Registration timestamp.
    pub registered_at: SystemTime,
}

/// Per-player result line stored with a match side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatLineEntity {
    /// Player tag.
    pub tag: String,
    /// Player display name at entry time.
    pub name: String,
    /// Stars scored.
    pub stars: u32,
    /// Destruction percentage.
    pub percent: f64,
}

/// Aggregate match record persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchEntity {
    /// Slug of the cup this match belongs to.
    pub cup: String,
    /// Deterministic bracket-slot identifier, unique within the cup.
    pub id: String,
    /// Human-readable label for boards.
    pub label: String,
    /// Round number.
    pub round: u32,
    /// Index of the format stage that produced the match.
    pub stage: usize,
    /// Sub-bracket tag (`page_playoff`, `upper`, `lower`, `grand_final`).
    pub bracket: Option<String>,
    /// First team name, or the `TBD` placeholder.
    pub team1: String,
    /// Second team name, or the `TBD` placeholder.
    pub team2: String,
    /// Whether a final result has been declared.
    pub completed: bool,
    /// Winning team name, the `Tie` sentinel, or `None` while pending.
    pub winner: Option<String>,
    /// Total stars for team 1.
    pub score1: u32,
    /// Total stars for team 2.
    pub score2: u32,
    /// Aggregated percentage for team 1.
    pub percent1: f64,
    /// Aggregated percentage for team 2.
    pub percent2: f64,
    /// Per-player lines for team 1.
    pub team1_stats: Vec<StatLineEntity>,
    /// Per-player lines for team 2.
    pub team2_stats: Vec<StatLineEntity>,
}
