//! DTOs for the roster management endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::validation::validate_player_name,
    state::roster::{Player, Role, Roster},
};

/// Public projection of a roster player.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct PlayerSummary {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Role used by the draw.
    pub role: Role,
    /// Whether the player takes part in the next draw.
    pub present: bool,
}

impl From<&Player> for PlayerSummary {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            role: player.role,
            present: player.present,
        }
    }
}

impl From<Player> for PlayerSummary {
    fn from(player: Player) -> Self {
        Self {
            id: player.id,
            name: player.name,
            role: player.role,
            present: player.present,
        }
    }
}

/// Full roster listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct RosterResponse {
    /// Players in display order.
    pub players: Vec<PlayerSummary>,
    /// Number of players.
    pub total: usize,
    /// Number of present players.
    pub present_count: usize,
}

impl From<&Roster> for RosterResponse {
    fn from(roster: &Roster) -> Self {
        Self {
            players: roster.iter().map(PlayerSummary::from).collect(),
            total: roster.len(),
            present_count: roster.present_count(),
        }
    }
}

/// Payload used to add a player to the roster.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePlayerRequest {
    /// Display name, trimmed and at most 64 characters.
    #[validate(custom(function = "validate_player_name"))]
    pub name: String,
    /// Defaults to `regular`.
    #[serde(default)]
    pub role: Role,
}

/// Partial update of a roster player. Omitted fields are left unchanged.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePlayerRequest {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New role.
    #[serde(default)]
    pub role: Option<Role>,
}

impl Validate for UpdatePlayerRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(ref name) = self.name {
            if let Err(e) = validate_player_name(name) {
                errors.add("name", e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Presence flag after a toggle.
#[derive(Debug, Serialize, ToSchema)]
pub struct PresenceResponse {
    /// Player identifier.
    pub id: String,
    /// Presence after the toggle.
    pub present: bool,
}
