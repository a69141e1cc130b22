use std::future::Future;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::{
        draw::DrawResponse,
        roster::PlayerSummary,
        sse::{
            CheckInConfirmedEvent, CheckInNewPlayerEvent, PlayerDeletedEvent, PlayerEvent,
            RosterUpdatedEvent, ServerEvent, SystemStatus,
        },
    },
    state::{SharedState, roster::Roster},
};

const EVENT_PLAYER_CREATED: &str = "player.created";
const EVENT_PLAYER_UPDATED: &str = "player.updated";
const EVENT_PLAYER_DELETED: &str = "player.deleted";
const EVENT_ROSTER_UPDATED: &str = "roster.updated";
const EVENT_ROSTER_CLEARED: &str = "roster.cleared";
const EVENT_TEAMS_DRAWN: &str = "teams.drawn";
const EVENT_CHECKIN_CONFIRMED: &str = "checkin.confirmed";
const EVENT_CHECKIN_NEW_PLAYER: &str = "checkin.new_player";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast a newly added player.
pub fn broadcast_player_created(state: &SharedState, player: PlayerSummary) {
    send_event(state, EVENT_PLAYER_CREATED, &PlayerEvent { player });
}

/// Broadcast an edited player.
pub fn broadcast_player_updated(state: &SharedState, player: PlayerSummary) {
    send_event(state, EVENT_PLAYER_UPDATED, &PlayerEvent { player });
}

/// Broadcast a removed player.
pub fn broadcast_player_deleted(state: &SharedState, player_id: String) {
    send_event(state, EVENT_PLAYER_DELETED, &PlayerDeletedEvent { player_id });
}

/// Broadcast roster-wide counters after a bulk change.
pub fn broadcast_roster_updated(state: &SharedState, roster: &Roster) {
    let payload = RosterUpdatedEvent {
        total: roster.len(),
        present_count: roster.present_count(),
    };
    send_event(state, EVENT_ROSTER_UPDATED, &payload);
}

/// Broadcast that the roster was emptied.
pub fn broadcast_roster_cleared(state: &SharedState) {
    state.events().publish(ServerEvent::new(
        Some(EVENT_ROSTER_CLEARED.to_string()),
        "{}".to_string(),
    ));
}

/// Broadcast the outcome of a draw.
pub fn broadcast_teams_drawn(state: &SharedState, draw: &DrawResponse) {
    send_event(state, EVENT_TEAMS_DRAWN, draw);
}

/// Broadcast a confirmation received through a check-in link.
pub fn broadcast_checkin_confirmed(
    state: &SharedState,
    event_id: Uuid,
    player_id: &str,
    name: &str,
) {
    let payload = CheckInConfirmedEvent {
        event_id,
        player_id: player_id.to_string(),
        name: name.to_string(),
    };
    send_event(state, EVENT_CHECKIN_CONFIRMED, &payload);
}

/// Broadcast a self-registration received through a check-in link.
pub fn broadcast_checkin_new_player(state: &SharedState, event_id: Uuid, player: PlayerSummary) {
    send_event(
        state,
        EVENT_CHECKIN_NEW_PLAYER,
        &CheckInNewPlayerEvent { event_id, player },
    );
}

/// Broadcast the degraded flag.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    send_event(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

/// Relay degraded-mode flips to SSE subscribers.
///
/// The watcher is registered before the future is returned, so flips happening before it is
/// first polled are still delivered.
pub fn forward_degraded_changes(state: SharedState) -> impl Future<Output = ()> + Send + 'static {
    let mut watcher = state.degraded_watcher();
    async move {
        while watcher.changed().await.is_ok() {
            let degraded = *watcher.borrow_and_update();
            info!(degraded, "storage status changed");
            broadcast_system_status(&state, degraded);
        }
    }
}

fn send_event<T: Serialize>(state: &SharedState, name: &str, payload: &T) {
    match ServerEvent::json(Some(name.to_string()), payload) {
        Ok(event) => {
            state.events().publish(event);
        }
        Err(err) => warn!(event = name, error = %err, "failed to serialise SSE payload"),
    }
}
