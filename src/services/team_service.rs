//! Team lifecycle: registration with an optional approval gate, roster
//! edits, and deletion with match cascade.

use std::{collections::HashSet, time::SystemTime};

use tracing::info;
use validator::Validate;

use crate::{
    dao::cup_store::MatchFilter,
    dto::team::{EditRosterRequest, RegisterTeamRequest, RosterSlotInput, TeamSummary},
    error::ServiceError,
    services::{
        cup_service::require_cup,
        events::{broadcast_team_created, broadcast_team_deleted, broadcast_team_updated},
    },
    state::{
        SharedState,
        cup::{RosterSlot, Team, TeamStatus},
    },
};

/// Register a team into a cup.
///
/// When the cup format carries an approval gate the team lands in `pending`
/// and must be approved by staff before it joins any draw.
pub async fn register_team(
    state: &SharedState,
    slug: &str,
    request: RegisterTeamRequest,
) -> Result<TeamSummary, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;

    let store = state.require_cup_store().await?;
    let cup = require_cup(&store, slug).await?;

    let name = request.name.trim().to_owned();
    let existing = store.list_teams(slug).await?;
    if existing.iter().any(|team| team.name == name) {
        return Err(ServiceError::AlreadyExists(format!("team `{name}`")));
    }

    let roster = build_roster(
        state,
        &request.roster,
        cup.format.roster_size,
        &existing.iter().map(|t| t.clone().into_team()).collect::<Vec<_>>(),
        None,
    )
    .await?;

    let captain_tag = request.captain_tag.trim().to_owned();
    let Some(captain) = roster.iter().find(|slot| slot.tag == captain_tag) else {
        return Err(ServiceError::InvalidInput(format!(
            "captain tag {captain_tag} must be one of the registered players"
        )));
    };

    let team = Team {
        name,
        captain_tag,
        captain_name: captain.name.clone(),
        roster,
        eliminated: false,
        status: if cup.format.approval_gate {
            TeamStatus::Pending
        } else {
            TeamStatus::Active
        },
        registered_at: SystemTime::now(),
    };

    store.save_team(team.clone().into_entity(slug)).await?;
    info!(cup = slug, team = %team.name, status = ?team.status, "team registered");

    let summary = TeamSummary::from(team);
    broadcast_team_created(state, summary.clone());
    Ok(summary)
}

/// Approve a pending team so it becomes eligible for draws.
pub async fn approve_team(
    state: &SharedState,
    slug: &str,
    name: &str,
) -> Result<TeamSummary, ServiceError> {
    let store = state.require_cup_store().await?;
    require_cup(&store, slug).await?;

    let mut team = require_team(&store, slug, name).await?;
    if team.status != TeamStatus::Pending {
        return Err(ServiceError::InvalidState(format!(
            "team `{name}` is not awaiting approval"
        )));
    }

    team.status = TeamStatus::Active;
    store.save_team(team.clone().into_entity(slug)).await?;
    info!(cup = slug, team = name, "team approved");

    let summary = TeamSummary::from(team);
    broadcast_team_updated(state, summary.clone());
    Ok(summary)
}

/// Reject a pending application, removing the team entirely.
pub async fn reject_team(state: &SharedState, slug: &str, name: &str) -> Result<(), ServiceError> {
    let store = state.require_cup_store().await?;
    require_cup(&store, slug).await?;

    let team = require_team(&store, slug, name).await?;
    if team.status != TeamStatus::Pending {
        return Err(ServiceError::InvalidState(format!(
            "team `{name}` is not awaiting approval"
        )));
    }

    store.delete_team(slug, name).await?;
    info!(cup = slug, team = name, "application rejected");
    broadcast_team_deleted(state, name);
    Ok(())
}

/// Replace a team's roster (and captain), re-running all uniqueness checks.
pub async fn edit_roster(
    state: &SharedState,
    slug: &str,
    name: &str,
    request: EditRosterRequest,
) -> Result<TeamSummary, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;

    let store = state.require_cup_store().await?;
    let cup = require_cup(&store, slug).await?;
    let mut team = require_team(&store, slug, name).await?;

    let others: Vec<Team> = store
        .list_teams(slug)
        .await?
        .into_iter()
        .filter(|entity| entity.name != name)
        .map(|entity| entity.into_team())
        .collect();

    let roster = build_roster(
        state,
        &request.roster,
        cup.format.roster_size,
        &others,
        Some(name),
    )
    .await?;

    let captain_tag = request.captain_tag.trim().to_owned();
    let Some(captain) = roster.iter().find(|slot| slot.tag == captain_tag) else {
        return Err(ServiceError::InvalidInput(format!(
            "captain tag {captain_tag} must be one of the registered players"
        )));
    };

    team.captain_name = captain.name.clone();
    team.captain_tag = captain_tag;
    team.roster = roster;
    store.save_team(team.clone().into_entity(slug)).await?;
    info!(cup = slug, team = name, "roster updated");

    let summary = TeamSummary::from(team);
    broadcast_team_updated(state, summary.clone());
    Ok(summary)
}

/// Delete a team and cascade-invalidate its pending matches.
///
/// Matches the team already completed stay as history; matches that can no
/// longer be played legitimately are removed.
pub async fn remove_team(state: &SharedState, slug: &str, name: &str) -> Result<(), ServiceError> {
    let _gate = state.lock_progression().await;
    let store = state.require_cup_store().await?;
    require_cup(&store, slug).await?;
    require_team(&store, slug, name).await?;

    store.delete_team(slug, name).await?;

    let pending = store
        .list_matches(
            slug,
            MatchFilter {
                completed: Some(false),
                ..MatchFilter::default()
            },
        )
        .await?;
    let mut invalidated = 0u32;
    for entity in pending {
        if entity.team1 == name || entity.team2 == name {
            store.delete_match(slug, &entity.id).await?;
            invalidated += 1;
        }
    }

    info!(cup = slug, team = name, invalidated, "team removed");
    broadcast_team_deleted(state, name);
    Ok(())
}

/// List every team of a cup in registration order.
pub async fn list_teams(state: &SharedState, slug: &str) -> Result<Vec<TeamSummary>, ServiceError> {
    let store = state.require_cup_store().await?;
    require_cup(&store, slug).await?;
    let teams = store.list_teams(slug).await?;
    Ok(teams
        .into_iter()
        .map(|entity| entity.into_team().into())
        .collect())
}

async fn require_team(
    store: &std::sync::Arc<dyn crate::dao::cup_store::CupStore>,
    slug: &str,
    name: &str,
) -> Result<Team, ServiceError> {
    let Some(entity) = store.find_team(slug, name).await? else {
        return Err(ServiceError::NotFound(format!("team `{name}` not found")));
    };
    Ok(entity.into_team())
}

/// Normalize, dedupe and resolve a submitted roster.
///
/// Enforces the format's roster size, tag uniqueness within the submission
/// and across every other team of the cup, then resolves display names and
/// town-hall levels through the player directory (falling back to the tag
/// when the player is unknown).
async fn build_roster(
    state: &SharedState,
    slots: &[RosterSlotInput],
    roster_size: usize,
    other_teams: &[Team],
    editing: Option<&str>,
) -> Result<Vec<RosterSlot>, ServiceError> {
    if slots.len() != roster_size {
        return Err(ServiceError::InvalidInput(format!(
            "roster must have exactly {roster_size} players, got {}",
            slots.len()
        )));
    }

    let mut seen = HashSet::new();
    let mut roster = Vec::with_capacity(slots.len());

    for slot in slots {
        let tag = slot.tag.trim().to_owned();
        if !seen.insert(tag.clone()) {
            return Err(ServiceError::InvalidInput(format!(
                "duplicate tag {tag} in the submitted roster"
            )));
        }

        for team in other_teams {
            if editing == Some(team.name.as_str()) {
                continue;
            }
            if team.roster.iter().any(|member| member.tag == tag) {
                return Err(ServiceError::InvalidInput(format!(
                    "player {tag} is already registered in team `{}`",
                    team.name
                )));
            }
        }

        let profile = state.directory().resolve(&tag).await;
        let (name, town_hall) = match profile {
            Some(profile) => (profile.name, profile.town_hall.or(slot.town_hall)),
            None => (tag.trim_start_matches('#').to_owned(), slot.town_hall),
        };

        roster.push(RosterSlot {
            tag,
            name,
            town_hall,
        });
    }

    Ok(roster)
}
