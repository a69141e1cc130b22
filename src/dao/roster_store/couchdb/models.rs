use std::time::SystemTime;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{
    CheckInEventEntity, EventHistoryEntity, EventPlayerEntity, NewPlayerEntity, PlayerEntity,
    RosterEntity,
};

use super::error::CouchDaoError;

/// Document id prefix of roster documents.
pub const ROSTER_PREFIX: &str = "roster::";
/// Document id prefix of check-in event documents.
pub const EVENT_PREFIX: &str = "event::";

/// Document carrying a roster and its check-in bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchRosterDocument {
    /// Prefixed document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Revision, absent on first insert.
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// Roster payload stored beside the CouchDB metadata.
    #[serde(flatten)]
    pub roster: RosterBody,
}

/// Roster fields as stored in the document body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterBody {
    /// Players in display order.
    pub players: Vec<PlayerEntity>,
    /// Active check-in event.
    #[serde(default)]
    pub active_event_id: Option<Uuid>,
    /// Most recent events first.
    #[serde(default)]
    pub event_history: Vec<EventHistoryEntity>,
    /// Last save time.
    pub updated_at: SystemTime,
}

impl From<(RosterEntity, Option<String>)> for CouchRosterDocument {
    fn from((roster, rev): (RosterEntity, Option<String>)) -> Self {
        Self {
            id: roster_doc_id(&roster.id),
            rev,
            roster: RosterBody {
                players: roster.players,
                active_event_id: roster.active_event_id,
                event_history: roster.event_history,
                updated_at: roster.updated_at,
            },
        }
    }
}

impl TryFrom<CouchRosterDocument> for RosterEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchRosterDocument) -> Result<Self, Self::Error> {
        let id = doc
            .id
            .strip_prefix(ROSTER_PREFIX)
            .ok_or_else(|| CouchDaoError::InvalidDocId {
                doc_id: doc.id.clone(),
                kind: "missing roster prefix",
            })?
            .to_string();

        Ok(Self {
            id,
            players: doc.roster.players,
            active_event_id: doc.roster.active_event_id,
            event_history: doc.roster.event_history,
            updated_at: doc.roster.updated_at,
        })
    }
}

/// Document carrying a shared check-in event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchEventDocument {
    /// Prefixed document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Revision, absent on first insert.
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// Event payload stored beside the CouchDB metadata.
    #[serde(flatten)]
    pub event: EventBody,
}

/// Event fields as stored in the document body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBody {
    /// When the event was shared.
    pub created_at: SystemTime,
    /// Roster snapshot.
    pub players: Vec<EventPlayerEntity>,
    /// Confirmation time keyed by player identifier.
    #[serde(default)]
    pub confirmations: IndexMap<String, SystemTime>,
    /// Self-registered players keyed by identifier.
    #[serde(default)]
    pub new_players: IndexMap<String, NewPlayerEntity>,
}

impl From<(CheckInEventEntity, Option<String>)> for CouchEventDocument {
    fn from((event, rev): (CheckInEventEntity, Option<String>)) -> Self {
        Self {
            id: event_doc_id(event.id),
            rev,
            event: EventBody {
                created_at: event.created_at,
                players: event.players,
                confirmations: event.confirmations,
                new_players: event.new_players,
            },
        }
    }
}

impl TryFrom<CouchEventDocument> for CheckInEventEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchEventDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: extract_uuid(&doc.id)?,
            created_at: doc.event.created_at,
            players: doc.event.players,
            confirmations: doc.event.confirmations,
            new_players: doc.event.new_players,
        })
    }
}

/// Document id of the roster stored under `id`.
pub fn roster_doc_id(id: &str) -> String {
    format!("{}{}", ROSTER_PREFIX, id)
}

/// Document id of the event `id`.
pub fn event_doc_id(id: Uuid) -> String {
    format!("{}{}", EVENT_PREFIX, id)
}

/// Parse the UUID that follows the `::` separator of a document id.
pub fn extract_uuid(doc_id: &str) -> Result<Uuid, CouchDaoError> {
    let (_, id) = doc_id
        .split_once("::")
        .ok_or_else(|| CouchDaoError::InvalidDocId {
            doc_id: doc_id.to_string(),
            kind: "missing separator",
        })?;

    Uuid::parse_str(id).map_err(|_| CouchDaoError::InvalidDocId {
        doc_id: doc_id.to_string(),
        kind: "invalid UUID",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::roster::Role;

    #[test]
    fn roster_document_keeps_key_and_players() {
        let mut roster = RosterEntity::empty("team-sorter-players");
        roster.players.push(PlayerEntity {
            id: "p1".into(),
            name: "Ana".into(),
            role: Role::Goalkeeper,
            present: false,
        });

        let doc = CouchRosterDocument::from((roster.clone(), Some("1-abc".into())));
        assert_eq!(doc.id, "roster::team-sorter-players");

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["_rev"], "1-abc");
        assert_eq!(json["players"][0]["role"], "goalkeeper");

        let back: RosterEntity = doc.try_into().unwrap();
        assert_eq!(back, roster);
    }

    #[test]
    fn event_document_requires_uuid_id() {
        let event = CheckInEventEntity::new(Vec::new());
        let doc = CouchEventDocument::from((event.clone(), None));
        assert!(serde_json::to_value(&doc).unwrap().get("_rev").is_none());
        let back: CheckInEventEntity = doc.clone().try_into().unwrap();
        assert_eq!(back.id, event.id);

        let broken = CouchEventDocument {
            id: "event::not-a-uuid".into(),
            ..doc
        };
        assert!(matches!(
            CheckInEventEntity::try_from(broken),
            Err(CouchDaoError::InvalidDocId { .. })
        ));
    }
}
