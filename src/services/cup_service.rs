//! Cup lifecycle: creation from a format preset, listing, and full reset.

use std::{sync::Arc, time::SystemTime};

use tracing::info;
use validator::Validate;

use crate::{
    dao::cup_store::CupStore,
    dto::cup::{CreateCupRequest, CupSummary},
    error::ServiceError,
    services::events::broadcast_cup_reset,
    state::{SharedState, cup::Cup},
};

/// Create a new cup from a configured format preset.
pub async fn create_cup(
    state: &SharedState,
    request: CreateCupRequest,
) -> Result<CupSummary, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;

    let store = state.require_cup_store().await?;

    let Some(format) = state.config().format(&request.format) else {
        let known: Vec<&str> = state.config().format_names().collect();
        return Err(ServiceError::InvalidInput(format!(
            "unknown format preset `{}` (available: {})",
            request.format,
            known.join(", ")
        )));
    };

    if store.find_cup(&request.slug).await?.is_some() {
        return Err(ServiceError::AlreadyExists(format!(
            "cup `{}`",
            request.slug
        )));
    }

    let cup = Cup {
        slug: request.slug,
        name: request.name.trim().to_owned(),
        format: format.clone(),
        created_at: SystemTime::now(),
    };
    store.save_cup(cup.clone().into()).await?;
    info!(cup = %cup.slug, format = %request.format, "created cup");

    Ok(cup.into())
}

/// List every cup.
pub async fn list_cups(state: &SharedState) -> Result<Vec<CupSummary>, ServiceError> {
    let store = state.require_cup_store().await?;
    let cups = store.list_cups().await?;
    Ok(cups
        .into_iter()
        .map(|entity| Cup::from(entity).into())
        .collect())
}

/// Fetch a single cup by slug.
pub async fn get_cup(state: &SharedState, slug: &str) -> Result<CupSummary, ServiceError> {
    let store = state.require_cup_store().await?;
    let cup = require_cup(&store, slug).await?;
    Ok(cup.into())
}

/// Wipe every match of the cup and clear elimination flags, returning the
/// cup to its pre-draw state. Teams and the format stay.
pub async fn reset_cup(state: &SharedState, slug: &str) -> Result<(), ServiceError> {
    let _gate = state.lock_progression().await;
    let store = state.require_cup_store().await?;
    require_cup(&store, slug).await?;

    store.delete_matches(slug).await?;

    for entity in store.list_teams(slug).await? {
        if entity.eliminated {
            let mut team = entity.into_team();
            team.eliminated = false;
            store.save_team(team.into_entity(slug)).await?;
        }
    }

    info!(cup = slug, "tournament reset");
    broadcast_cup_reset(state, slug);
    Ok(())
}

/// Fetch a cup or fail with the not-found error.
pub(crate) async fn require_cup(
    store: &Arc<dyn CupStore>,
    slug: &str,
) -> Result<Cup, ServiceError> {
    let Some(entity) = store.find_cup(slug).await? else {
        return Err(ServiceError::NotFound(format!("cup `{slug}` not found")));
    };
    Ok(entity.into())
}
