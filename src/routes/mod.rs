use axum::Router;

use crate::state::SharedState;

/// Check-in event endpoints.
pub mod checkin;
/// Swagger UI and OpenAPI document.
pub mod docs;
/// Team draw endpoints.
pub mod draw;
/// Health endpoint.
pub mod health;
/// Roster endpoints.
pub mod roster;
/// Server-Sent Events stream.
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(roster::router())
        .merge(draw::router())
        .merge(checkin::router())
        .merge(sse::router())
        .merge(docs::router());

    api_router.with_state(state)
}
