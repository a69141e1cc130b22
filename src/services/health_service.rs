use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report degraded mode and roster size while logging storage connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.roster_store().await {
        Some(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "storage health check failed");
            }
        }
        None => warn!("storage unavailable (degraded mode)"),
    }

    let players = state.read_organizer(|organizer| organizer.roster.len()).await;
    HealthResponse::new(state.is_degraded(), players)
}
