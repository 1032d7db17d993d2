use std::time::SystemTime;

use crate::dao::models::{
    CupEntity, MatchEntity, RosterSlotEntity, StatLineEntity, TeamEntity, TeamStatusEntity,
};
use crate::config::FormatSpec;

/// Placeholder shown in a match slot before the feeder results resolve.
pub const TBD: &str = "TBD";
/// Sentinel stored in a persisted `winner` field for drawn matches.
pub(crate) const TIE: &str = "Tie";

/// One player slot on a team roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSlot {
    /// In-game player tag (unique across the whole cup).
    pub tag: String,
    /// Resolved display name for the player.
    pub name: String,
    /// Town-hall level, when the identity resolver supplied one.
    pub town_hall: Option<u8>,
}

/// Approval status of a registered team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamStatus {
    /// Waiting for staff approval; not yet part of any draw.
    Pending,
    /// Approved and eligible for match generation.
    Active,
}

/// A team registered into a cup.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    /// Team name, unique within the cup.
    pub name: String,
    /// Tag of the captain (must be one of the roster tags).
    pub captain_tag: String,
    /// Resolved captain display name.
    pub captain_name: String,
    /// Fixed-size roster; length matches the cup format.
    pub roster: Vec<RosterSlot>,
    /// Set by the engine when the team is knocked out of an elimination bracket.
    pub eliminated: bool,
    /// Approval status.
    pub status: TeamStatus,
    /// Registration timestamp.
    pub registered_at: SystemTime,
}

impl Team {
    /// Whether the team takes part in draws: approved and still alive.
    pub fn is_in_contention(&self) -> bool {
        self.status == TeamStatus::Active && !self.eliminated
    }
}

/// Per-player result line inside a match side.
#[derive(Debug, Clone, PartialEq)]
pub struct StatLine {
    /// Player tag the line belongs to.
    pub tag: String,
    /// Player display name at entry time.
    pub name: String,
    /// Stars scored by the player.
    pub stars: u32,
    /// Destruction percentage in `[0, 100]`.
    pub percent: f64,
}

/// Final outcome of a completed match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A decisive result; carries the winning team name.
    Winner(String),
    /// Both sides level on stars and percent.
    Tie,
}

/// Sub-bracket a match belongs to, for formats that run parallel brackets
/// under one round number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketGroup {
    /// Final-four "double chance" bracket.
    PagePlayoff,
    /// Winners bracket of a double elimination.
    Upper,
    /// Losers bracket of a double elimination.
    Lower,
    /// Grand final node of a double elimination.
    GrandFinal,
}

impl BracketGroup {
    /// Stable tag persisted and exposed for this sub-bracket.
    pub fn as_str(self) -> &'static str {
        match self {
            BracketGroup::PagePlayoff => "page_playoff",
            BracketGroup::Upper => "upper",
            BracketGroup::Lower => "lower",
            BracketGroup::GrandFinal => "grand_final",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "page_playoff" => Some(BracketGroup::PagePlayoff),
            "upper" => Some(BracketGroup::Upper),
            "lower" => Some(BracketGroup::Lower),
            "grand_final" => Some(BracketGroup::GrandFinal),
            _ => None,
        }
    }
}

/// A single match between two teams, identified by a deterministic bracket
/// slot id such as `R1_M3`, `PP_Q1` or `UB_SF2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// Stable slot identifier, unique within the cup.
    pub id: String,
    /// Human-readable label for boards.
    pub label: String,
    /// Round number; unique across the whole cup, increasing per stage.
    pub round: u32,
    /// Index of the format stage this match belongs to.
    pub stage: usize,
    /// Sub-bracket tag for parallel brackets sharing a round number.
    pub bracket: Option<BracketGroup>,
    /// First team name, or [`TBD`].
    pub team1: String,
    /// Second team name, or [`TBD`].
    pub team2: String,
    /// Whether a final result has been declared.
    pub completed: bool,
    /// Declared outcome; `None` while the match is pending.
    pub outcome: Option<Outcome>,
    /// Total stars for team 1.
    pub score1: u32,
    /// Total stars for team 2.
    pub score2: u32,
    /// Aggregated percentage for team 1 (sum or average per format).
    pub percent1: f64,
    /// Aggregated percentage for team 2.
    pub percent2: f64,
    /// Per-player lines for team 1; empty until entered.
    pub team1_stats: Vec<StatLine>,
    /// Per-player lines for team 2; empty until entered.
    pub team2_stats: Vec<StatLine>,
}

impl Match {
    /// Build a fresh, unplayed match for the given slot.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        round: u32,
        stage: usize,
        bracket: Option<BracketGroup>,
        team1: impl Into<String>,
        team2: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            round,
            stage,
            bracket,
            team1: team1.into(),
            team2: team2.into(),
            completed: false,
            outcome: None,
            score1: 0,
            score2: 0,
            percent1: 0.0,
            percent2: 0.0,
            team1_stats: Vec::new(),
            team2_stats: Vec::new(),
        }
    }

    /// Whether both team slots are resolved.
    pub fn has_teams(&self) -> bool {
        self.team1 != TBD && self.team2 != TBD
    }

    /// Name of the winning team, when the match completed decisively.
    pub fn winner_name(&self) -> Option<&str> {
        match &self.outcome {
            Some(Outcome::Winner(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Name of the losing team, when the match completed decisively.
    pub fn loser_name(&self) -> Option<&str> {
        let winner = self.winner_name()?;
        if winner == self.team1 {
            Some(self.team2.as_str())
        } else {
            Some(self.team1.as_str())
        }
    }

    /// Whether the given team plays in this match.
    pub fn involves(&self, team: &str) -> bool {
        self.team1 == team || self.team2 == team
    }
}

/// A tournament instance: name, format and creation time, keyed by slug.
#[derive(Debug, Clone, PartialEq)]
pub struct Cup {
    /// URL-safe unique identifier.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Format selected once at creation; never branched on ad hoc.
    pub format: FormatSpec,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

impl From<TeamStatusEntity> for TeamStatus {
    fn from(value: TeamStatusEntity) -> Self {
        match value {
            TeamStatusEntity::Pending => TeamStatus::Pending,
            TeamStatusEntity::Active => TeamStatus::Active,
        }
    }
}

impl From<TeamStatus> for TeamStatusEntity {
    fn from(value: TeamStatus) -> Self {
        match value {
            TeamStatus::Pending => TeamStatusEntity::Pending,
            TeamStatus::Active => TeamStatusEntity::Active,
        }
    }
}

impl From<RosterSlotEntity> for RosterSlot {
    fn from(value: RosterSlotEntity) -> Self {
        Self {
            tag: value.tag,
            name: value.name,
            town_hall: value.town_hall,
        }
    }
}

impl From<RosterSlot> for RosterSlotEntity {
    fn from(value: RosterSlot) -> Self {
        Self {
            tag: value.tag,
            name: value.name,
            town_hall: value.town_hall,
        }
    }
}

impl From<StatLineEntity> for StatLine {
    fn from(value: StatLineEntity) -> Self {
        Self {
            tag: value.tag,
            name: value.name,
            stars: value.stars,
            percent: value.percent,
        }
    }
}

impl From<StatLine> for StatLineEntity {
    fn from(value: StatLine) -> Self {
        Self {
            tag: value.tag,
            name: value.name,
            stars: value.stars,
            percent: value.percent,
        }
    }
}

impl TeamEntity {
    /// Convert a persisted team into its runtime form.
    pub fn into_team(self) -> Team {
        Team {
            name: self.name,
            captain_tag: self.captain_tag,
            captain_name: self.captain_name,
            roster: self.roster.into_iter().map(Into::into).collect(),
            eliminated: self.eliminated,
            status: self.status.into(),
            registered_at: self.registered_at,
        }
    }
}

impl Team {
    /// Convert the runtime team into its persisted form for the given cup.
    pub fn into_entity(self, cup: &str) -> TeamEntity {
        TeamEntity {
            cup: cup.to_owned(),
            name: self.name,
            captain_tag: self.captain_tag,
            captain_name: self.captain_name,
            roster: self.roster.into_iter().map(Into::into).collect(),
            eliminated: self.eliminated,
            status: self.status.into(),
            registered_at: self.registered_at,
        }
    }
}

impl MatchEntity {
    /// Convert a persisted match into its runtime form.
    pub fn into_match(self) -> Match {
        let outcome = match self.winner {
            Some(name) if name == TIE => Some(Outcome::Tie),
            Some(name) => Some(Outcome::Winner(name)),
            None => None,
        };

        Match {
            id: self.id,
            label: self.label,
            round: self.round,
            stage: self.stage,
            bracket: self.bracket.as_deref().and_then(BracketGroup::parse),
            team1: self.team1,
            team2: self.team2,
            completed: self.completed,
            outcome,
            score1: self.score1,
            score2: self.score2,
            percent1: self.percent1,
            percent2: self.percent2,
            team1_stats: self.team1_stats.into_iter().map(Into::into).collect(),
            team2_stats: self.team2_stats.into_iter().map(Into::into).collect(),
        }
    }
}

impl Match {
    /// Convert the runtime match into its persisted form for the given cup.
    pub fn into_entity(self, cup: &str) -> MatchEntity {
        let winner = match self.outcome {
            Some(Outcome::Winner(name)) => Some(name),
            Some(Outcome::Tie) => Some(TIE.to_owned()),
            None => None,
        };

        MatchEntity {
            cup: cup.to_owned(),
            id: self.id,
            label: self.label,
            round: self.round,
            stage: self.stage,
            bracket: self.bracket.map(|group| group.as_str().to_owned()),
            team1: self.team1,
            team2: self.team2,
            completed: self.completed,
            winner,
            score1: self.score1,
            score2: self.score2,
            percent1: self.percent1,
            percent2: self.percent2,
            team1_stats: self.team1_stats.into_iter().map(Into::into).collect(),
            team2_stats: self.team2_stats.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<CupEntity> for Cup {
    fn from(value: CupEntity) -> Self {
        Self {
            slug: value.slug,
            name: value.name,
            format: value.format,
            created_at: value.created_at,
        }
    }
}

impl From<Cup> for CupEntity {
    fn from(value: Cup) -> Self {
        Self {
            slug: value.slug,
            name: value.name,
            format: value.format,
            created_at: value.created_at,
        }
    }
}
