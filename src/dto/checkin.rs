//! DTOs for the check-in flow: shared events, confirmations and self-registration.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{CheckInEventEntity, EventHistoryEntity},
    dto::{format_system_time, validation::validate_player_name},
    state::roster::Role,
};

/// Links and message produced when a check-in event is shared.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateEventResponse {
    /// Identifier of the new event.
    pub event_id: Uuid,
    /// Page where invitees pick their name.
    pub link: String,
    /// Plain-text invitation, ready to paste in a group chat.
    pub message: String,
    /// Messenger deep link opening a chat with a pre-filled, formatted invitation.
    pub share_url: String,
    /// Players frozen into the event.
    pub player_count: usize,
}

/// Player of an event snapshot as shown to invitees.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventPlayerSummary {
    /// Roster identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: Role,
    /// Whether the player already confirmed.
    pub confirmed: bool,
    /// One-click confirmation link for this player.
    pub confirmation_link: String,
}

/// Everything an invitee needs to confirm attendance.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventRosterResponse {
    /// Event identifier.
    pub event_id: Uuid,
    /// Creation time, RFC 3339.
    pub created_at: String,
    /// Snapshot players in roster order.
    pub players: Vec<EventPlayerSummary>,
    /// Link for people missing from the snapshot.
    pub registration_link: String,
}

impl EventRosterResponse {
    /// Build the invitee view of `event`, using `link_for` to derive per-player links.
    pub fn from_event<F>(event: &CheckInEventEntity, registration_link: String, link_for: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        Self {
            event_id: event.id,
            created_at: format_system_time(event.created_at),
            players: event
                .players
                .iter()
                .map(|player| EventPlayerSummary {
                    id: player.id.clone(),
                    name: player.name.clone(),
                    role: player.role,
                    confirmed: event.confirmations.contains_key(&player.id),
                    confirmation_link: link_for(&player.id),
                })
                .collect(),
            registration_link,
        }
    }
}

/// Whether the confirmation was new.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStatus {
    /// First confirmation for this player.
    Confirmed,
    /// The player had already confirmed; the original time is kept.
    AlreadyConfirmed,
}

/// Result of an invitee confirming attendance.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConfirmationResponse {
    /// Whether the confirmation was new.
    pub status: ConfirmationStatus,
    /// Confirmed player.
    pub player_id: String,
    /// Display name of the confirmed player.
    pub name: String,
}

/// Self-registration submitted by someone missing from the event snapshot.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterPlayerRequest {
    /// Display name, validated like roster names.
    #[validate(custom(function = "validate_player_name"))]
    pub name: String,
    /// Defaults to `regular`.
    #[serde(default)]
    pub role: Role,
}

/// Identifier allocated to a self-registered player.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterPlayerResponse {
    /// Identifier generated for the registration.
    pub player_id: String,
    /// Normalized display name.
    pub name: String,
    /// Role picked by the invitee.
    pub role: Role,
}

/// Event to pull confirmations from; the active event when omitted.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SyncEventRequest {
    /// Event to sync.
    #[serde(default)]
    pub event_id: Option<Uuid>,
}

/// Counts of roster changes pulled from an event.
#[derive(Debug, Serialize, ToSchema)]
pub struct SyncEventResponse {
    /// Event the changes were pulled from.
    pub event_id: Uuid,
    /// Roster players that were absent and are now present.
    pub confirmed_count: usize,
    /// Self-registered players appended to the roster.
    pub new_player_count: usize,
    /// Human-readable summary for the organizer.
    pub message: String,
}

/// Manually typed event identifier to reactivate.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReactivateEventRequest {
    /// Identifier as pasted by the organizer.
    pub event_id: String,
}

/// Activation flag of an event after a toggle or reactivation.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventActivationResponse {
    /// Event identifier.
    pub event_id: Uuid,
    /// Whether the event now feeds the roster.
    pub active: bool,
}

/// Entry of the recently shared events list.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventHistoryItem {
    /// Event identifier.
    pub id: Uuid,
    /// Creation date formatted for display.
    pub date: String,
    /// Whether this is the active event.
    pub active: bool,
}

/// Recently shared events, newest first.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct EventHistoryResponse {
    /// Active event, omitted when none.
    pub active_event_id: Option<Uuid>,
    /// Newest first.
    pub events: Vec<EventHistoryItem>,
}

impl EventHistoryResponse {
    /// Build the listing, flagging the entry matching `active_event_id`.
    pub fn new(active_event_id: Option<Uuid>, history: &[EventHistoryEntity]) -> Self {
        Self {
            active_event_id,
            events: history
                .iter()
                .map(|entry| EventHistoryItem {
                    id: entry.id,
                    date: entry.date.clone(),
                    active: active_event_id == Some(entry.id),
                })
                .collect(),
        }
    }
}
