use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for the team sorter backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::roster::list_players,
        crate::routes::roster::add_player,
        crate::routes::roster::clear_roster,
        crate::routes::roster::update_player,
        crate::routes::roster::remove_player,
        crate::routes::roster::toggle_presence,
        crate::routes::draw::draw_teams,
        crate::routes::draw::last_draw,
        crate::routes::checkin::create_event,
        crate::routes::checkin::event_history,
        crate::routes::checkin::sync_event,
        crate::routes::checkin::reactivate_event,
        crate::routes::checkin::toggle_event,
        crate::routes::checkin::event_roster,
        crate::routes::checkin::confirm_attendance,
        crate::routes::checkin::register_new_player,
        crate::routes::sse::roster_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::state::roster::Role,
            crate::dto::roster::PlayerSummary,
            crate::dto::roster::RosterResponse,
            crate::dto::roster::CreatePlayerRequest,
            crate::dto::roster::UpdatePlayerRequest,
            crate::dto::roster::PresenceResponse,
            crate::dto::draw::DrawTeamsRequest,
            crate::dto::draw::TeamSummary,
            crate::dto::draw::DrawResponse,
            crate::dto::checkin::CreateEventResponse,
            crate::dto::checkin::EventPlayerSummary,
            crate::dto::checkin::EventRosterResponse,
            crate::dto::checkin::ConfirmationStatus,
            crate::dto::checkin::ConfirmationResponse,
            crate::dto::checkin::RegisterPlayerRequest,
            crate::dto::checkin::RegisterPlayerResponse,
            crate::dto::checkin::SyncEventRequest,
            crate::dto::checkin::SyncEventResponse,
            crate::dto::checkin::ReactivateEventRequest,
            crate::dto::checkin::EventActivationResponse,
            crate::dto::checkin::EventHistoryItem,
            crate::dto::checkin::EventHistoryResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::PlayerEvent,
            crate::dto::sse::PlayerDeletedEvent,
            crate::dto::sse::RosterUpdatedEvent,
            crate::dto::sse::CheckInConfirmedEvent,
            crate::dto::sse::CheckInNewPlayerEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "roster", description = "Roster management"),
        (name = "teams", description = "Balanced team draws"),
        (name = "checkin", description = "Shared check-in events and confirmations"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/healthcheck",
            "/players",
            "/players/{id}",
            "/players/{id}/presence",
            "/teams/draw",
            "/teams/last",
            "/events",
            "/events/sync",
            "/events/reactivate",
            "/events/{id}/toggle",
            "/events/{id}/roster",
            "/events/{id}/confirm/{player_id}",
            "/events/{id}/players",
            "/sse/roster",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
