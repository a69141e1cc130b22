//! Process-local store used when no database is configured, and by tests.

use std::{sync::Arc, time::SystemTime};

use dashmap::DashMap;
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    models::{CheckInEventEntity, NewPlayerEntity, RosterEntity},
    roster_store::RosterStore,
    storage::StorageResult,
};

/// [`RosterStore`] keeping everything in process memory. Clones share the same maps.
#[derive(Clone, Default)]
pub struct MemoryRosterStore {
    rosters: Arc<DashMap<String, RosterEntity>>,
    events: Arc<DashMap<Uuid, CheckInEventEntity>>,
}

impl MemoryRosterStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RosterStore for MemoryRosterStore {
    fn load_roster(&self, id: String) -> BoxFuture<'static, StorageResult<Option<RosterEntity>>> {
        let found = self.rosters.get(&id).map(|entry| entry.value().clone());
        Box::pin(async move { Ok(found) })
    }

    fn save_roster(&self, roster: RosterEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.rosters.insert(roster.id.clone(), roster);
        Box::pin(async { Ok(()) })
    }

    fn save_event(&self, event: CheckInEventEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.events.insert(event.id, event);
        Box::pin(async { Ok(()) })
    }

    fn find_event(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<CheckInEventEntity>>> {
        let found = self.events.get(&id).map(|entry| entry.value().clone());
        Box::pin(async move { Ok(found) })
    }

    fn record_confirmation(
        &self,
        event_id: Uuid,
        player_id: String,
        confirmed_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<CheckInEventEntity>>> {
        let updated = self.events.get_mut(&event_id).map(|mut entry| {
            entry.confirmations.entry(player_id).or_insert(confirmed_at);
            entry.value().clone()
        });
        Box::pin(async move { Ok(updated) })
    }

    fn record_new_player(
        &self,
        event_id: Uuid,
        player_id: String,
        player: NewPlayerEntity,
    ) -> BoxFuture<'static, StorageResult<Option<CheckInEventEntity>>> {
        let updated = self.events.get_mut(&event_id).map(|mut entry| {
            entry.new_players.insert(player_id, player);
            entry.value().clone()
        });
        Box::pin(async move { Ok(updated) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn roster_round_trips_by_key() {
        let store = MemoryRosterStore::new();
        assert!(store.load_roster("main".into()).await.unwrap().is_none());

        store.save_roster(RosterEntity::empty("main")).await.unwrap();
        let loaded = store.load_roster("main".into()).await.unwrap().unwrap();
        assert_eq!(loaded.id, "main");
        assert!(store.load_roster("other".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn saving_an_event_replaces_previous_version() {
        let store = MemoryRosterStore::new();
        let mut event = CheckInEventEntity::new(Vec::new());
        store.save_event(event.clone()).await.unwrap();

        event
            .confirmations
            .insert("p1".into(), std::time::SystemTime::now());
        store.save_event(event.clone()).await.unwrap();

        let loaded = store.find_event(event.id).await.unwrap().unwrap();
        assert_eq!(loaded.confirmations.len(), 1);
    }

    #[tokio::test]
    async fn confirmations_keep_the_first_timestamp() {
        let store = MemoryRosterStore::new();
        let event = CheckInEventEntity::new(Vec::new());
        store.save_event(event.clone()).await.unwrap();

        let first = SystemTime::UNIX_EPOCH;
        store
            .record_confirmation(event.id, "p1".into(), first)
            .await
            .unwrap()
            .unwrap();
        let updated = store
            .record_confirmation(event.id, "p1".into(), SystemTime::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.confirmations.get("p1"), Some(&first));
    }

    #[tokio::test]
    async fn recording_on_unknown_event_yields_none() {
        let store = MemoryRosterStore::new();
        let outcome = store
            .record_new_player(
                Uuid::new_v4(),
                "p1".into(),
                NewPlayerEntity {
                    name: "Bia".into(),
                    role: crate::state::roster::Role::Regular,
                    registered_at: SystemTime::now(),
                },
            )
            .await
            .unwrap();
        assert!(outcome.is_none());
    }
}
