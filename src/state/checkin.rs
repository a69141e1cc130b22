//! Bookkeeping of shared check-in events: which one is active and which were shared recently.

use std::time::SystemTime;

use time::{OffsetDateTime, macros::format_description};
use uuid::Uuid;

use crate::dao::models::EventHistoryEntity;

/// Active event pointer plus a bounded, most-recent-first history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckInLog {
    active_event_id: Option<Uuid>,
    history: Vec<EventHistoryEntity>,
}

impl CheckInLog {
    /// Restore the log from persisted fields.
    pub fn new(active_event_id: Option<Uuid>, history: Vec<EventHistoryEntity>) -> Self {
        Self {
            active_event_id,
            history,
        }
    }

    /// Event currently feeding the roster.
    pub fn active_event_id(&self) -> Option<Uuid> {
        self.active_event_id
    }

    /// Recently shared events, newest first.
    pub fn history(&self) -> &[EventHistoryEntity] {
        &self.history
    }

    /// Whether `id` is the active event.
    pub fn is_active(&self, id: Uuid) -> bool {
        self.active_event_id == Some(id)
    }

    /// Make `id` the active event.
    pub fn activate(&mut self, id: Uuid) {
        self.active_event_id = Some(id);
    }

    /// Deactivate `id` when it is the active event, otherwise make it active.
    ///
    /// Returns whether `id` is active afterwards.
    pub fn toggle(&mut self, id: Uuid) -> bool {
        if self.is_active(id) {
            self.active_event_id = None;
            false
        } else {
            self.active_event_id = Some(id);
            true
        }
    }

    /// Put `id` at the front of the history, dropping older duplicates and trimming to `limit`.
    pub fn record(&mut self, id: Uuid, created_at: SystemTime, limit: usize) {
        self.history.retain(|entry| entry.id != id);
        self.history.insert(
            0,
            EventHistoryEntity {
                id,
                date: format_history_date(created_at),
            },
        );
        self.history.truncate(limit);
    }

    /// Add `id` to the history only when it is not listed yet.
    ///
    /// Returns `true` when an entry was added.
    pub fn remember(&mut self, id: Uuid, seen_at: SystemTime, limit: usize) -> bool {
        if self.history.iter().any(|entry| entry.id == id) {
            return false;
        }
        self.record(id, seen_at, limit);
        true
    }
}

/// `dd/mm/yyyy hh:mm` in UTC.
pub fn format_history_date(time: SystemTime) -> String {
    let format = format_description!("[day]/[month]/[year] [hour]:[minute]");
    OffsetDateTime::from(time)
        .format(&format)
        .unwrap_or_else(|_| "invalid-date".into())
}
