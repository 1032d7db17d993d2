use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Clash Cup Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::sse::admin_stream,
        crate::routes::cups::create_cup,
        crate::routes::cups::list_cups,
        crate::routes::cups::get_cup,
        crate::routes::cups::reset_cup,
        crate::routes::teams::register_team,
        crate::routes::teams::list_teams,
        crate::routes::teams::approve_team,
        crate::routes::teams::reject_team,
        crate::routes::teams::edit_roster,
        crate::routes::teams::remove_team,
        crate::routes::matches::generate_round,
        crate::routes::matches::list_matches,
        crate::routes::matches::enter_stats,
        crate::routes::matches::finalize_match,
        crate::routes::matches::reopen_match,
        crate::routes::matches::standings,
        crate::routes::matches::bracket,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::sse::AdminHandshake,
            crate::dto::cup::CupSummary,
            crate::dto::team::TeamSummary,
            crate::dto::matches::MatchSummary,
            crate::dto::matches::StandingsRow,
            crate::config::FormatSpec,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "cups", description = "Cup lifecycle"),
        (name = "teams", description = "Team registration and management"),
        (name = "matches", description = "Rounds, results and standings"),
    )
)]
pub struct ApiDoc;
