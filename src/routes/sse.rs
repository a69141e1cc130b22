use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/roster",
    tag = "sse",
    responses((status = 200, description = "Roster change notifications", content_type = "text/event-stream", body = String))
)]
/// Stream roster, draw and check-in notifications to connected frontends.
pub async fn roster_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = sse_service::subscribe(&state);
    info!(
        subscribers = state.events().subscriber_count(),
        "new roster SSE connection"
    );
    sse_service::to_sse_stream(receiver, sse_service::handshake(&state))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/roster", get(roster_stream))
}
