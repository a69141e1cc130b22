use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::state::roster::Role;

/// Player record as persisted with the roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Stable opaque identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Role used by the draw.
    pub role: Role,
    /// Presence flag; rosters written before it existed load everyone as present.
    #[serde(default = "default_present")]
    pub present: bool,
}

fn default_present() -> bool {
    true
}

/// Entry of the recently shared check-in events list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventHistoryEntity {
    /// Event identifier.
    pub id: Uuid,
    /// Creation date already formatted for display.
    pub date: String,
}

/// Aggregate persisted under the application-chosen roster key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RosterEntity {
    /// Storage key of the roster.
    pub id: String,
    /// Players in display order.
    pub players: Vec<PlayerEntity>,
    /// Check-in event whose confirmations flow straight into the roster.
    #[serde(default)]
    pub active_event_id: Option<Uuid>,
    /// Most recent events first.
    #[serde(default)]
    pub event_history: Vec<EventHistoryEntity>,
    /// Last time the roster was saved.
    pub updated_at: SystemTime,
}

impl RosterEntity {
    /// Empty roster stored under `id`.
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            players: Vec::new(),
            active_event_id: None,
            event_history: Vec::new(),
            updated_at: SystemTime::now(),
        }
    }
}

/// Roster entry frozen into a check-in event when it is shared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventPlayerEntity {
    /// Roster identifier of the player.
    pub id: String,
    /// Display name at share time.
    pub name: String,
    /// Role at share time.
    pub role: Role,
}

/// Self-registration submitted through a check-in link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewPlayerEntity {
    /// Display name as typed by the invitee.
    pub name: String,
    /// Role picked by the invitee.
    pub role: Role,
    /// When the registration was received.
    pub registered_at: SystemTime,
}

/// Shared check-in event with the confirmations collected so far.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckInEventEntity {
    /// Primary key of the event, embedded in the invitation link.
    pub id: Uuid,
    /// When the event was shared.
    pub created_at: SystemTime,
    /// Roster snapshot taken when the event was shared.
    pub players: Vec<EventPlayerEntity>,
    /// Confirmation time keyed by player identifier.
    #[serde(default)]
    pub confirmations: IndexMap<String, SystemTime>,
    /// Self-registered players keyed by their freshly generated identifier.
    #[serde(default)]
    pub new_players: IndexMap<String, NewPlayerEntity>,
}

impl CheckInEventEntity {
    /// Build a new event from a roster snapshot, allocating a fresh identifier.
    pub fn new(players: Vec<EventPlayerEntity>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: SystemTime::now(),
            players,
            confirmations: IndexMap::new(),
            new_players: IndexMap::new(),
        }
    }

    /// Look up a player of the snapshot.
    pub fn player(&self, id: &str) -> Option<&EventPlayerEntity> {
        self.players.iter().find(|player| player.id == id)
    }
}
