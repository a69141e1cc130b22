use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::roster::PlayerSummary;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// SSE event name, `None` for the default `message` event.
    pub event: Option<String>,
    /// JSON payload.
    pub data: String,
}

impl ServerEvent {
    /// Build an event from an already serialised payload.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    /// Whether the backend is now degraded.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a player is added or edited.
pub struct PlayerEvent {
    /// Player after the change.
    pub player: PlayerSummary,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a player is removed from the roster.
pub struct PlayerDeletedEvent {
    /// Identifier of the removed player.
    pub player_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the roster is replaced as a whole (hydration, clear, sync).
pub struct RosterUpdatedEvent {
    /// Number of players.
    pub total: usize,
    /// Number of present players.
    pub present_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when an invitee confirms attendance through a check-in link.
pub struct CheckInConfirmedEvent {
    /// Event the confirmation came through.
    pub event_id: Uuid,
    /// Confirmed player.
    pub player_id: String,
    /// Display name of the confirmed player.
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when someone registers through a check-in link.
pub struct CheckInNewPlayerEvent {
    /// Event the registration came through.
    pub event_id: Uuid,
    /// Registered player as added to the roster.
    pub player: PlayerSummary,
}
