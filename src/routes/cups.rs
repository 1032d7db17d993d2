use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::cup::{CreateCupRequest, CupSummary},
    error::AppError,
    services::cup_service,
    state::SharedState,
};

/// Routes handling cup lifecycle operations.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/cups", post(create_cup).get(list_cups))
        .route("/cups/{slug}", get(get_cup))
        .route("/cups/{slug}/reset", post(reset_cup))
}

/// Create a new cup from a configured format preset.
#[utoipa::path(
    post,
    path = "/cups",
    tag = "cups",
    request_body = CreateCupRequest,
    responses(
        (status = 200, description = "Cup created", body = CupSummary)
    )
)]
pub async fn create_cup(
    State(state): State<SharedState>,
    Json(payload): Json<CreateCupRequest>,
) -> Result<Json<CupSummary>, AppError> {
    let summary = cup_service::create_cup(&state, payload).await?;
    Ok(Json(summary))
}

/// List every cup.
#[utoipa::path(
    get,
    path = "/cups",
    tag = "cups",
    responses(
        (status = 200, description = "All cups", body = [CupSummary])
    )
)]
pub async fn list_cups(
    State(state): State<SharedState>,
) -> Result<Json<Vec<CupSummary>>, AppError> {
    let cups = cup_service::list_cups(&state).await?;
    Ok(Json(cups))
}

/// Fetch a single cup.
#[utoipa::path(
    get,
    path = "/cups/{slug}",
    tag = "cups",
    params(("slug" = String, Path, description = "Cup identifier")),
    responses(
        (status = 200, description = "The cup", body = CupSummary)
    )
)]
pub async fn get_cup(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<CupSummary>, AppError> {
    let summary = cup_service::get_cup(&state, &slug).await?;
    Ok(Json(summary))
}

/// Wipe every match and clear eliminations, keeping teams and format.
#[utoipa::path(
    post,
    path = "/cups/{slug}/reset",
    tag = "cups",
    params(("slug" = String, Path, description = "Cup identifier")),
    responses(
        (status = 204, description = "Cup reset")
    )
)]
pub async fn reset_cup(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<axum::http::StatusCode, AppError> {
    cup_service::reset_cup(&state, &slug).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
