use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{post, put},
};

use crate::{
    dto::team::{EditRosterRequest, RegisterTeamRequest, TeamSummary},
    error::AppError,
    services::team_service,
    state::SharedState,
};

/// Routes handling team registration and management.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/cups/{slug}/teams", post(register_team).get(list_teams))
        .route(
            "/cups/{slug}/teams/{name}",
            put(edit_roster).delete(remove_team),
        )
        .route("/cups/{slug}/teams/{name}/approve", post(approve_team))
        .route("/cups/{slug}/teams/{name}/reject", post(reject_team))
}

/// Register a team; it lands in `pending` when the format has an approval gate.
#[utoipa::path(
    post,
    path = "/cups/{slug}/teams",
    tag = "teams",
    params(("slug" = String, Path, description = "Cup identifier")),
    request_body = RegisterTeamRequest,
    responses(
        (status = 200, description = "Team registered", body = TeamSummary)
    )
)]
pub async fn register_team(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    Json(payload): Json<RegisterTeamRequest>,
) -> Result<Json<TeamSummary>, AppError> {
    let summary = team_service::register_team(&state, &slug, payload).await?;
    Ok(Json(summary))
}

/// List every team of a cup.
#[utoipa::path(
    get,
    path = "/cups/{slug}/teams",
    tag = "teams",
    params(("slug" = String, Path, description = "Cup identifier")),
    responses(
        (status = 200, description = "All teams", body = [TeamSummary])
    )
)]
pub async fn list_teams(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<TeamSummary>>, AppError> {
    let teams = team_service::list_teams(&state, &slug).await?;
    Ok(Json(teams))
}

/// Approve a pending team.
#[utoipa::path(
    post,
    path = "/cups/{slug}/teams/{name}/approve",
    tag = "teams",
    params(
        ("slug" = String, Path, description = "Cup identifier"),
        ("name" = String, Path, description = "Team name")
    ),
    responses(
        (status = 200, description = "Team approved", body = TeamSummary)
    )
)]
pub async fn approve_team(
    State(state): State<SharedState>,
    Path((slug, name)): Path<(String, String)>,
) -> Result<Json<TeamSummary>, AppError> {
    let summary = team_service::approve_team(&state, &slug, &name).await?;
    Ok(Json(summary))
}

/// Reject a pending application, deleting the team.
#[utoipa::path(
    post,
    path = "/cups/{slug}/teams/{name}/reject",
    tag = "teams",
    params(
        ("slug" = String, Path, description = "Cup identifier"),
        ("name" = String, Path, description = "Team name")
    ),
    responses(
        (status = 204, description = "Application rejected")
    )
)]
pub async fn reject_team(
    State(state): State<SharedState>,
    Path((slug, name)): Path<(String, String)>,
) -> Result<axum::http::StatusCode, AppError> {
    team_service::reject_team(&state, &slug, &name).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Replace a team's roster and captain.
#[utoipa::path(
    put,
    path = "/cups/{slug}/teams/{name}",
    tag = "teams",
    params(
        ("slug" = String, Path, description = "Cup identifier"),
        ("name" = String, Path, description = "Team name")
    ),
    request_body = EditRosterRequest,
    responses(
        (status = 200, description = "Roster updated", body = TeamSummary)
    )
)]
pub async fn edit_roster(
    State(state): State<SharedState>,
    Path((slug, name)): Path<(String, String)>,
    Json(payload): Json<EditRosterRequest>,
) -> Result<Json<TeamSummary>, AppError> {
    let summary = team_service::edit_roster(&state, &slug, &name, payload).await?;
    Ok(Json(summary))
}

/// Delete a team, cascade-invalidating its pending matches.
#[utoipa::path(
    delete,
    path = "/cups/{slug}/teams/{name}",
    tag = "teams",
    params(
        ("slug" = String, Path, description = "Cup identifier"),
        ("name" = String, Path, description = "Team name")
    ),
    responses(
        (status = 204, description = "Team removed")
    )
)]
pub async fn remove_team(
    State(state): State<SharedState>,
    Path((slug, name)): Path<(String, String)>,
) -> Result<axum::http::StatusCode, AppError> {
    team_service::remove_team(&state, &slug, &name).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
