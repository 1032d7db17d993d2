use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    dto::validation::validate_player_tag,
    engine::standings::StandingsEntry,
    state::cup::{Match, Outcome, StatLine},
    state::match_phase::MatchPhase,
};

/// One player's result line in a stat submission.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StatLineInput {
    /// Player tag; must belong to the side's roster.
    pub tag: String,
    /// Stars scored.
    pub stars: u32,
    /// Destruction percentage in `[0, 100]`.
    pub percent: f64,
}

impl Validate for StatLineInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_player_tag(self.tag.trim()) {
            errors.add("tag", e);
        }
        if !(0.0..=100.0).contains(&self.percent) || !self.percent.is_finite() {
            let mut err = ValidationError::new("percent_range");
            err.message = Some("percent must be between 0 and 100".into());
            errors.add("percent", err);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload recording one side's per-player stats.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SideStatsRequest {
    /// One line per roster member, in any order.
    pub lines: Vec<StatLineInput>,
}

impl Validate for SideStatsRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for line in &self.lines {
            errors.merge_self("lines", line.validate());
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Per-player result line returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatLineDto {
    /// Player tag.
    pub tag: String,
    /// Player display name at entry time.
    pub name: String,
    /// Stars scored.
    pub stars: u32,
    /// Destruction percentage.
    pub percent: f64,
}

impl From<StatLine> for StatLineDto {
    fn from(value: StatLine) -> Self {
        Self {
            tag: value.tag,
            name: value.name,
            stars: value.stars,
            percent: value.percent,
        }
    }
}

/// Match representation returned by the API and carried in SSE events.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchSummary {
    /// Bracket-slot identifier.
    pub id: String,
    /// Human-readable label.
    pub label: String,
    /// Round number.
    pub round: u32,
    /// Format stage index.
    pub stage: usize,
    /// Sub-bracket tag, when the stage runs parallel brackets.
    pub bracket: Option<String>,
    /// First team name, or `TBD`.
    pub team1: String,
    /// Second team name, or `TBD`.
    pub team2: String,
    /// Lifecycle phase (`pending_teams`, `ready`, `stats_partial`, `completed`).
    pub phase: String,
    /// Whether a final result has been declared.
    pub completed: bool,
    /// Winning team name, `Tie`, or `null` while pending.
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
    pub team1_stats: Vec<StatLineDto>,
    /// Per-player lines for team 2.
    pub team2_stats: Vec<StatLineDto>,
}

impl From<Match> for MatchSummary {
    fn from(value: Match) -> Self {
        let phase = match MatchPhase::of(&value) {
            MatchPhase::PendingTeams => "pending_teams",
            MatchPhase::Ready => "ready",
            MatchPhase::StatsPartial => "stats_partial",
            MatchPhase::Completed => "completed",
        };
        let winner = match &value.outcome {
            Some(Outcome::Winner(name)) => Some(name.clone()),
            Some(Outcome::Tie) => Some("Tie".to_owned()),
            None => None,
        };

        Self {
            id: value.id,
            label: value.label,
            round: value.round,
            stage: value.stage,
            bracket: value.bracket.map(|group| group.as_str().to_owned()),
            team1: value.team1,
            team2: value.team2,
            phase: phase.to_owned(),
            completed: value.completed,
            winner,
            score1: value.score1,
            score2: value.score2,
            percent1: value.percent1,
            percent2: value.percent2,
            team1_stats: value.team1_stats.into_iter().map(Into::into).collect(),
            team2_stats: value.team2_stats.into_iter().map(Into::into).collect(),
        }
    }
}

/// Query parameters accepted by the match listing endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct MatchListQuery {
    /// Restrict to a single round.
    pub round: Option<u32>,
    /// Restrict by completion state.
    pub completed: Option<bool>,
}

/// Response to a round/stage generation request.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GeneratedRound {
    /// First round number of the generated batch.
    pub round: u32,
    /// Newly created matches.
    pub matches: Vec<MatchSummary>,
}

/// One row of the standings table.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StandingsRow {
    /// Team name.
    pub team: String,
    /// Completed matches played.
    pub played: u32,
    /// Decisive wins.
    pub wins: u32,
    /// Decisive losses.
    pub losses: u32,
    /// Drawn matches.
    pub ties: u32,
    /// League points.
    pub points: u32,
    /// Accumulated stars.
    pub total_stars: u32,
    /// Accumulated percent aggregates.
    pub total_percent: f64,
}

impl From<StandingsEntry> for StandingsRow {
    fn from(value: StandingsEntry) -> Self {
        Self {
            team: value.team,
            played: value.played,
            wins: value.wins,
            losses: value.losses,
            ties: value.ties,
            points: value.points,
            total_stars: value.total_stars,
            total_percent: value.total_percent,
        }
    }
}

/// Matches of one round, grouped for bracket views.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BracketRound {
    /// Round number.
    pub round: u32,
    /// Matches of the round in id order.
    pub matches: Vec<MatchSummary>,
}
