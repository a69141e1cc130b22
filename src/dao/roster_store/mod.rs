/// CouchDB-backed roster store.
#[cfg(feature = "couch-store")]
pub mod couchdb;
/// In-process roster store used when no database is configured.
pub mod memory;

use std::time::SystemTime;

use crate::dao::models::{CheckInEventEntity, NewPlayerEntity, RosterEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for rosters and check-in events.
pub trait RosterStore: Send + Sync {
    /// Load the roster stored under `id`, or `None` when nothing was saved yet.
    fn load_roster(&self, id: String) -> BoxFuture<'static, StorageResult<Option<RosterEntity>>>;
    /// Insert or overwrite the roster aggregate.
    fn save_roster(&self, roster: RosterEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Insert or overwrite a check-in event.
    fn save_event(&self, event: CheckInEventEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Look up a check-in event by identifier.
    fn find_event(&self, id: Uuid)
    -> BoxFuture<'static, StorageResult<Option<CheckInEventEntity>>>;
    /// Store a confirmation on an event, keeping the earliest timestamp when one exists.
    ///
    /// Resolves to the updated event, or `None` when the event does not exist.
    fn record_confirmation(
        &self,
        event_id: Uuid,
        player_id: String,
        confirmed_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<CheckInEventEntity>>>;
    /// Store a self-registered player on an event.
    ///
    /// Resolves to the updated event, or `None` when the event does not exist.
    fn record_new_player(
        &self,
        event_id: Uuid,
        player_id: String,
        player: NewPlayerEntity,
    ) -> BoxFuture<'static, StorageResult<Option<CheckInEventEntity>>>;
    /// Cheap round trip proving the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
