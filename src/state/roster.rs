//! In-memory roster of players tracked by the organizer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dao::models::{EventPlayerEntity, PlayerEntity, RosterEntity};

/// Longest display name accepted for a player.
pub const MAX_NAME_LENGTH: usize = 64;

/// Closed set of roles a player can hold.
///
/// Captains and goalkeepers are seated one per team by the assignment engine; children are
/// distributed like regular players and only differ in how frontends render them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Field player without constraints.
    #[default]
    Regular,
    /// At most one per team.
    #[serde(alias = "Capitão")]
    Captain,
    /// At most one per team.
    #[serde(alias = "Goleiro")]
    Goalkeeper,
    /// Balanced like a regular player.
    #[serde(alias = "Criança")]
    Child,
}

impl Role {
    /// Whether the role carries a one-per-team seating constraint.
    pub fn is_seeded(self) -> bool {
        matches!(self, Role::Captain | Role::Goalkeeper)
    }
}

/// Player tracked on the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Stable opaque identifier.
    pub id: String,
    /// Display name, trimmed and never empty.
    pub name: String,
    /// Role used by the assignment engine.
    pub role: Role,
    /// Whether the player takes part in the next draw.
    pub present: bool,
}

impl Player {
    /// Build a freshly created player, present by default.
    pub fn new(name: String, role: Role) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name, role)
    }

    /// Build a present player with a caller-chosen identifier.
    pub fn with_id(id: String, name: String, role: Role) -> Self {
        Self {
            id,
            name,
            role,
            present: true,
        }
    }
}

/// Insertion-ordered collection of players keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    players: IndexMap<String, Player>,
}

impl Roster {
    /// Empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether the roster has no players.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Iterate over players in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Player with identifier `id`.
    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    /// Whether a player with identifier `id` exists.
    pub fn contains(&self, id: &str) -> bool {
        self.players.contains_key(id)
    }

    /// Append a player at the end of the roster.
    ///
    /// Returns `false` and leaves the roster untouched when the identifier is already taken.
    pub fn insert(&mut self, player: Player) -> bool {
        if self.players.contains_key(&player.id) {
            return false;
        }
        self.players.insert(player.id.clone(), player);
        true
    }

    /// Remove a player while keeping the order of the others.
    pub fn remove(&mut self, id: &str) -> Option<Player> {
        self.players.shift_remove(id)
    }

    /// Mutable access to the player with identifier `id`.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    /// Flip the presence flag and return the new value.
    pub fn toggle_presence(&mut self, id: &str) -> Option<bool> {
        let player = self.players.get_mut(id)?;
        player.present = !player.present;
        Some(player.present)
    }

    /// Mark a player present. Returns `Some(true)` when the flag actually changed.
    pub fn mark_present(&mut self, id: &str) -> Option<bool> {
        let player = self.players.get_mut(id)?;
        let changed = !player.present;
        player.present = true;
        Some(changed)
    }

    /// Remove every player.
    pub fn clear(&mut self) {
        self.players.clear();
    }

    /// Clone the present players, preserving roster order.
    pub fn present_players(&self) -> Vec<Player> {
        self.players
            .values()
            .filter(|player| player.present)
            .cloned()
            .collect()
    }

    /// Number of present players.
    pub fn present_count(&self) -> usize {
        self.players.values().filter(|player| player.present).count()
    }

    /// Snapshot of identifiers, names and roles handed to invitees of a check-in event.
    pub fn event_snapshot(&self) -> Vec<EventPlayerEntity> {
        self.players
            .values()
            .map(|player| EventPlayerEntity {
                id: player.id.clone(),
                name: player.name.clone(),
                role: player.role,
            })
            .collect()
    }
}

impl FromIterator<Player> for Roster {
    fn from_iter<I: IntoIterator<Item = Player>>(iter: I) -> Self {
        let mut roster = Roster::new();
        for player in iter {
            roster.insert(player);
        }
        roster
    }
}

/// Trim a candidate display name and check it fits the roster constraints.
pub fn normalize_name(raw: &str) -> Option<String> {
    let name = raw.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
        None
    } else {
        Some(name.to_string())
    }
}

impl From<PlayerEntity> for Player {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            role: value.role,
            present: value.present,
        }
    }
}

impl From<Player> for PlayerEntity {
    fn from(value: Player) -> Self {
        Self {
            id: value.id,
            name: value.name,
            role: value.role,
            present: value.present,
        }
    }
}

impl From<&RosterEntity> for Roster {
    fn from(value: &RosterEntity) -> Self {
        value.players.iter().cloned().map(Player::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, present: bool) -> Player {
        Player {
            id: id.into(),
            name: format!("player {id}"),
            role: Role::Regular,
            present,
        }
    }

    #[test]
    fn only_captains_and_goalkeepers_are_seeded() {
        assert!(Role::Captain.is_seeded());
        assert!(Role::Goalkeeper.is_seeded());
        assert!(!Role::Regular.is_seeded());
        assert!(!Role::Child.is_seeded());
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let mut roster = Roster::new();
        assert!(roster.insert(player("a", true)));
        assert!(!roster.insert(player("a", false)));
        assert_eq!(roster.len(), 1);
        assert!(roster.get("a").unwrap().present);
    }

    #[test]
    fn remove_keeps_order_of_remaining_players() {
        let mut roster: Roster = ["a", "b", "c"].into_iter().map(|id| player(id, true)).collect();
        roster.remove("b");
        let ids: Vec<_> = roster.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn present_players_filters_absent_ones_in_order() {
        let roster: Roster = vec![player("a", true), player("b", false), player("c", true)]
            .into_iter()
            .collect();
        let present: Vec<_> = roster.present_players().into_iter().map(|p| p.id).collect();
        assert_eq!(present, vec!["a", "c"]);
        assert_eq!(roster.present_count(), 2);
    }

    #[test]
    fn toggle_and_mark_present_report_changes() {
        let mut roster: Roster = vec![player("a", true)].into_iter().collect();
        assert_eq!(roster.toggle_presence("a"), Some(false));
        assert_eq!(roster.mark_present("a"), Some(true));
        assert_eq!(roster.mark_present("a"), Some(false));
        assert_eq!(roster.toggle_presence("missing"), None);
    }

    #[test]
    fn normalize_name_trims_and_rejects_blank() {
        assert_eq!(normalize_name("  Ana "), Some("Ana".to_string()));
        assert_eq!(normalize_name("   "), None);
        assert_eq!(normalize_name(&"x".repeat(MAX_NAME_LENGTH + 1)), None);
    }

    #[test]
    fn role_accepts_legacy_labels() {
        let role: Role = serde_json::from_str("\"Goleiro\"").unwrap();
        assert_eq!(role, Role::Goalkeeper);
        let role: Role = serde_json::from_str("\"captain\"").unwrap();
        assert_eq!(role, Role::Captain);
        assert_eq!(serde_json::to_string(&Role::Child).unwrap(), "\"child\"");
    }
}
