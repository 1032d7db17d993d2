use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};

use crate::{
    dto::matches::{
        BracketRound, GeneratedRound, MatchListQuery, MatchSummary, SideStatsRequest, StandingsRow,
    },
    error::AppError,
    services::match_service,
    state::{SharedState, match_phase::Side},
};

/// Routes handling rounds, match results, standings and the bracket view.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/cups/{slug}/rounds", post(generate_round))
        .route("/cups/{slug}/matches", get(list_matches))
        .route("/cups/{slug}/matches/{id}/stats/{side}", put(enter_stats))
        .route("/cups/{slug}/matches/{id}/finalize", post(finalize_match))
        .route("/cups/{slug}/matches/{id}/reopen", post(reopen_match))
        .route("/cups/{slug}/standings", get(standings))
        .route("/cups/{slug}/bracket", get(bracket))
}

/// Generate the next round or stage for the cup.
#[utoipa::path(
    post,
    path = "/cups/{slug}/rounds",
    tag = "matches",
    params(("slug" = String, Path, description = "Cup identifier")),
    responses(
        (status = 200, description = "Round generated", body = GeneratedRound)
    )
)]
pub async fn generate_round(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<GeneratedRound>, AppError> {
    let round = match_service::generate_round(&state, &slug).await?;
    Ok(Json(round))
}

/// List matches, optionally filtered by round or completion state.
#[utoipa::path(
    get,
    path = "/cups/{slug}/matches",
    tag = "matches",
    params(
        ("slug" = String, Path, description = "Cup identifier"),
        MatchListQuery
    ),
    responses(
        (status = 200, description = "Matches", body = [MatchSummary])
    )
)]
pub async fn list_matches(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    Query(query): Query<MatchListQuery>,
) -> Result<Json<Vec<MatchSummary>>, AppError> {
    let matches = match_service::list_matches(&state, &slug, query).await?;
    Ok(Json(matches))
}

/// Record one side's per-player stats (`side` is `team1` or `team2`).
#[utoipa::path(
    put,
    path = "/cups/{slug}/matches/{id}/stats/{side}",
    tag = "matches",
    params(
        ("slug" = String, Path, description = "Cup identifier"),
        ("id" = String, Path, description = "Match identifier"),
        ("side" = String, Path, description = "`team1` or `team2`")
    ),
    request_body = SideStatsRequest,
    responses(
        (status = 200, description = "Stats recorded", body = MatchSummary)
    )
)]
pub async fn enter_stats(
    State(state): State<SharedState>,
    Path((slug, id, side)): Path<(String, String, String)>,
    Json(payload): Json<SideStatsRequest>,
) -> Result<Json<MatchSummary>, AppError> {
    let side = match side.as_str() {
        "team1" => Side::Team1,
        "team2" => Side::Team2,
        other => {
            return Err(AppError::BadRequest(format!(
                "side must be `team1` or `team2`, got `{other}`"
            )));
        }
    };
    let summary = match_service::enter_side_stats(&state, &slug, &id, side, payload).await?;
    Ok(Json(summary))
}

/// Finalize a match and advance the bracket.
#[utoipa::path(
    post,
    path = "/cups/{slug}/matches/{id}/finalize",
    tag = "matches",
    params(
        ("slug" = String, Path, description = "Cup identifier"),
        ("id" = String, Path, description = "Match identifier")
    ),
    responses(
        (status = 200, description = "Match finalized", body = MatchSummary)
    )
)]
pub async fn finalize_match(
    State(state): State<SharedState>,
    Path((slug, id)): Path<(String, String)>,
) -> Result<Json<MatchSummary>, AppError> {
    let summary = match_service::finalize_match(&state, &slug, &id).await?;
    Ok(Json(summary))
}

/// Reopen a completed match for result edits.
#[utoipa::path(
    post,
    path = "/cups/{slug}/matches/{id}/reopen",
    tag = "matches",
    params(
        ("slug" = String, Path, description = "Cup identifier"),
        ("id" = String, Path, description = "Match identifier")
    ),
    responses(
        (status = 200, description = "Match reopened", body = MatchSummary)
    )
)]
pub async fn reopen_match(
    State(state): State<SharedState>,
    Path((slug, id)): Path<(String, String)>,
) -> Result<Json<MatchSummary>, AppError> {
    let summary = match_service::reopen_match(&state, &slug, &id).await?;
    Ok(Json(summary))
}

/// Current standings table per the cup's ranking rule.
#[utoipa::path(
    get,
    path = "/cups/{slug}/standings",
    tag = "matches",
    params(("slug" = String, Path, description = "Cup identifier")),
    responses(
        (status = 200, description = "Standings", body = [StandingsRow])
    )
)]
pub async fn standings(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<StandingsRow>>, AppError> {
    let rows = match_service::standings(&state, &slug).await?;
    Ok(Json(rows))
}

/// Bracket snapshot: matches grouped by round.
#[utoipa::path(
    get,
    path = "/cups/{slug}/bracket",
    tag = "matches",
    params(("slug" = String, Path, description = "Cup identifier")),
    responses(
        (status = 200, description = "Bracket", body = [BracketRound])
    )
)]
pub async fn bracket(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<BracketRound>>, AppError> {
    let rounds = match_service::bracket(&state, &slug).await?;
    Ok(Json(rounds))
}
