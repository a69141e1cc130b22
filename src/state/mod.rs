/// Check-in event bookkeeping.
pub mod checkin;
/// Player roster.
pub mod roster;
mod sse;

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, watch};

use crate::{
    config::AppConfig,
    dao::{models::RosterEntity, roster_store::RosterStore},
    error::ServiceError,
    services::team_sorter::Team,
};

pub use self::sse::EventHub;
use self::{checkin::CheckInLog, roster::Roster};

/// Handle to the application state shared across tasks.
pub type SharedState = Arc<AppState>;

const SSE_CAPACITY: usize = 32;

/// Everything the organizer edits: the roster, the check-in bookkeeping persisted with it and
/// the latest draw taken from that roster.
#[derive(Debug, Clone, Default)]
pub struct OrganizerState {
    /// Registered players.
    pub roster: Roster,
    /// Active check-in event and the closed ones.
    pub checkin: CheckInLog,
    /// Latest successful draw. Lives beside the roster so clearing one also drops the other.
    /// Never persisted.
    pub last_draw: Option<DrawRecord>,
}

impl OrganizerState {
    /// Project the state into the persisted aggregate stored under `roster_id`.
    pub fn to_entity(&self, roster_id: &str) -> RosterEntity {
        RosterEntity {
            id: roster_id.to_string(),
            players: self.roster.iter().cloned().map(Into::into).collect(),
            active_event_id: self.checkin.active_event_id(),
            event_history: self.checkin.history().to_vec(),
            updated_at: std::time::SystemTime::now(),
        }
    }
}

impl From<RosterEntity> for OrganizerState {
    fn from(entity: RosterEntity) -> Self {
        Self {
            roster: Roster::from(&entity),
            checkin: CheckInLog::new(entity.active_event_id, entity.event_history),
            last_draw: None,
        }
    }
}

/// Outcome of the latest successful draw, kept until the roster is cleared.
#[derive(Debug, Clone)]
pub struct DrawRecord {
    /// Teams in label order.
    pub teams: Vec<Team>,
    /// Number of present players the draw was taken from.
    pub present_count: usize,
}

/// Central application state shared by every request handler.
pub struct AppState {
    config: AppConfig,
    roster_store: RwLock<Option<Arc<dyn RosterStore>>>,
    organizer: RwLock<OrganizerState>,
    events: EventHub,
    degraded: watch::Sender<bool>,
    checkin_gate: Mutex<()>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            roster_store: RwLock::new(None),
            organizer: RwLock::new(OrganizerState::default()),
            events: EventHub::new(SSE_CAPACITY),
            degraded: degraded_tx,
            checkin_gate: Mutex::new(()),
        })
    }

    /// Configuration the application was started with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current roster store, if one is installed.
    pub async fn roster_store(&self) -> Option<Arc<dyn RosterStore>> {
        let guard = self.roster_store.read().await;
        guard.as_ref().cloned()
    }

    /// Same as [`Self::roster_store`] but fails with [`ServiceError::Degraded`] when none is set
    /// or the supervisor flagged the backend as unhealthy.
    pub async fn require_roster_store(&self) -> Result<Arc<dyn RosterStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.roster_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new roster store implementation without touching the degraded flag.
    pub async fn set_roster_store(&self, store: Arc<dyn RosterStore>) {
        let mut guard = self.roster_store.write().await;
        *guard = Some(store);
    }

    /// Install a new roster store implementation and leave degraded mode.
    pub async fn install_roster_store(&self, store: Arc<dyn RosterStore>) {
        self.set_roster_store(store).await;
        self.update_degraded(false).await;
    }

    /// Remove the current roster store and enter degraded mode.
    pub async fn clear_roster_store(&self) {
        {
            let mut guard = self.roster_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    ///
    /// Returns `true` when the flag actually changed.
    pub async fn update_degraded(&self, value: bool) -> bool {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }

    /// Broadcast hub feeding the roster SSE stream.
    pub fn events(&self) -> &EventHub {
        &self.events
    }

    /// Serialises read-modify-write cycles on check-in events.
    pub fn checkin_gate(&self) -> &Mutex<()> {
        &self.checkin_gate
    }

    /// Run `f` against a read guard of the organizer state.
    pub async fn read_organizer<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&OrganizerState) -> T,
    {
        let guard = self.organizer.read().await;
        f(&guard)
    }

    /// Replace the persisted part of the organizer state, used when hydrating from storage.
    ///
    /// The last draw is carried over since storage never holds one.
    pub async fn replace_organizer(&self, mut organizer: OrganizerState) {
        let mut guard = self.organizer.write().await;
        organizer.last_draw = guard.last_draw.take();
        *guard = organizer;
    }

    /// Apply `f` to a draft of the organizer state, persist the draft and only then publish it.
    ///
    /// The write lock is held across persistence so concurrent edits are applied in order. When
    /// `f` or the store fails, the in-memory state is left untouched.
    pub async fn update_organizer<F, T>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut OrganizerState) -> Result<T, ServiceError>,
    {
        let store = self.require_roster_store().await?;
        let mut guard = self.organizer.write().await;
        let mut draft = guard.clone();
        let value = f(&mut draft)?;
        store
            .save_roster(draft.to_entity(&self.config.roster_id))
            .await?;
        *guard = draft;
        Ok(value)
    }

    /// Latest successful draw, if any.
    pub async fn last_draw(&self) -> Option<DrawRecord> {
        self.organizer.read().await.last_draw.clone()
    }

    /// Compute a draw from the current roster with `f` and store it as the last draw.
    ///
    /// The write lock is held from reading the roster to storing the record, so a roster edit
    /// cannot land in between. Nothing is persisted, which keeps draws available in degraded mode.
    pub async fn record_draw<F>(&self, f: F) -> Result<DrawRecord, ServiceError>
    where
        F: FnOnce(&Roster) -> Result<DrawRecord, ServiceError>,
    {
        let mut guard = self.organizer.write().await;
        let record = f(&guard.roster)?;
        guard.last_draw = Some(record.clone());
        Ok(record)
    }
}
