//! HTTP surface: thin handlers delegating to the service layer.

use axum::Router;

use crate::state::SharedState;

pub mod cups;
pub mod docs;
pub mod health;
pub mod matches;
pub mod sse;
pub mod teams;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(cups::router())
        .merge(teams::router())
        .merge(matches::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
