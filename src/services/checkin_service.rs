//! Check-in events: invitation links and messages, invitee confirmations and syncing them back
//! into the roster.

use std::time::SystemTime;

use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::{
    dao::models::{CheckInEventEntity, NewPlayerEntity},
    dto::{
        checkin::{
            ConfirmationResponse, ConfirmationStatus, CreateEventResponse, EventActivationResponse,
            EventHistoryResponse, EventRosterResponse, RegisterPlayerRequest,
            RegisterPlayerResponse, SyncEventResponse,
        },
        roster::PlayerSummary,
    },
    error::ServiceError,
    services::{roster_service, sse_events},
    state::{
        SharedState,
        roster::{Player, normalize_name},
    },
};

const SHARE_BASE_URL: &str = "https://wa.me/";
const CALL_TO_ACTION: &str = "Click here to confirm:";

/// Page where invitees pick their name: `{base}/?event={event}`.
pub fn invitation_link(base: &Url, event_id: Uuid) -> String {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("event", &event_id.to_string());
    url.into()
}

/// One-tap confirmation for a given invitee: `{base}/?confirm={event}&p={player}`.
pub fn confirmation_link(base: &Url, event_id: Uuid, player_id: &str) -> String {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("confirm", &event_id.to_string())
        .append_pair("p", player_id);
    url.into()
}

/// Self-registration page for people missing from the snapshot: `{base}/?new={event}`.
pub fn registration_link(base: &Url, event_id: Uuid) -> String {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair("new", &event_id.to_string());
    url.into()
}

/// Invitation text. `bold` wraps the title and the call to action in messenger bold markup.
pub fn invitation_message(title: &str, link: &str, bold: bool) -> String {
    let (title, call_to_action) = if bold {
        (format!("*{title}*"), format!("*{CALL_TO_ACTION}*"))
    } else {
        (title.to_string(), CALL_TO_ACTION.to_string())
    };
    format!(
        "{title}\n\n{call_to_action}\n{link}\n\nA page listing every name will open\nJust tap yours!"
    )
}

/// Messenger deep link with `message` pre-filled.
pub fn share_url(message: &str) -> Result<String, ServiceError> {
    let url = Url::parse_with_params(SHARE_BASE_URL, &[("text", message)])
        .map_err(|err| ServiceError::InvalidInput(format!("cannot build share link: {err}")))?;
    // Form encoding turns spaces into `+`; the messenger expects percent-encoding.
    Ok(url.as_str().replace('+', "%20"))
}

/// Share the current roster as a new check-in event, making it the active one.
pub async fn create_event(state: &SharedState) -> Result<CreateEventResponse, ServiceError> {
    let store = state.require_roster_store().await?;
    let snapshot = state
        .read_organizer(|organizer| organizer.roster.event_snapshot())
        .await;
    if snapshot.is_empty() {
        return Err(ServiceError::InvalidInput(
            "add players before sharing a check-in event".into(),
        ));
    }

    let event = CheckInEventEntity::new(snapshot);
    let (event_id, created_at, player_count) = (event.id, event.created_at, event.players.len());
    store.save_event(event).await?;

    let limit = state.config().event_history_limit;
    state
        .update_organizer(|organizer| {
            organizer.checkin.activate(event_id);
            organizer.checkin.record(event_id, created_at, limit);
            Ok(())
        })
        .await?;

    let config = state.config();
    let link = invitation_link(&config.public_base_url, event_id);
    let message = invitation_message(&config.checkin_title, &link, false);
    let share_url = share_url(&invitation_message(&config.checkin_title, &link, true))?;

    info!(%event_id, player_count, "check-in event created");
    Ok(CreateEventResponse {
        event_id,
        link,
        message,
        share_url,
        player_count,
    })
}

/// Snapshot players of an event with their confirmation links.
pub async fn event_roster(
    state: &SharedState,
    event_id: Uuid,
) -> Result<EventRosterResponse, ServiceError> {
    let event = load_event(state, event_id).await?;
    let base = &state.config().public_base_url;
    Ok(EventRosterResponse::from_event(
        &event,
        registration_link(base, event_id),
        |player_id| confirmation_link(base, event_id, player_id),
    ))
}

/// Record that an invitee from the snapshot will attend.
///
/// When the event is active the roster player is marked present right away.
pub async fn confirm_attendance(
    state: &SharedState,
    event_id: Uuid,
    player_id: &str,
) -> Result<ConfirmationResponse, ServiceError> {
    let store = state.require_roster_store().await?;
    let _gate = state.checkin_gate().lock().await;

    let event = load_event(state, event_id).await?;
    let name = event
        .player(player_id)
        .map(|player| player.name.clone())
        .ok_or_else(|| ServiceError::NotFound(format!("player `{player_id}` in event")))?;

    if event.confirmations.contains_key(player_id) {
        return Ok(ConfirmationResponse {
            status: ConfirmationStatus::AlreadyConfirmed,
            player_id: player_id.to_string(),
            name,
        });
    }

    store
        .record_confirmation(event_id, player_id.to_string(), SystemTime::now())
        .await?
        .ok_or_else(|| event_not_found(event_id))?;
    info!(%event_id, player_id, "attendance confirmed");

    if is_active(state, event_id).await {
        match roster_service::set_presence(state, player_id, true).await {
            Ok(_) => {}
            // Removed from the roster since the event was shared.
            Err(ServiceError::NotFound(_)) => {
                debug!(player_id, "confirmed player no longer on roster")
            }
            Err(err) => return Err(err),
        }
    }
    sse_events::broadcast_checkin_confirmed(state, event_id, player_id, &name);

    Ok(ConfirmationResponse {
        status: ConfirmationStatus::Confirmed,
        player_id: player_id.to_string(),
        name,
    })
}

/// Register someone missing from the snapshot. Active events add them to the roster too.
pub async fn register_new_player(
    state: &SharedState,
    event_id: Uuid,
    request: RegisterPlayerRequest,
) -> Result<RegisterPlayerResponse, ServiceError> {
    let name = normalize_name(&request.name)
        .ok_or_else(|| ServiceError::InvalidInput("player name is invalid".into()))?;
    let store = state.require_roster_store().await?;
    let player = Player::new(name, request.role);

    store
        .record_new_player(
            event_id,
            player.id.clone(),
            NewPlayerEntity {
                name: player.name.clone(),
                role: player.role,
                registered_at: SystemTime::now(),
            },
        )
        .await?
        .ok_or_else(|| event_not_found(event_id))?;
    info!(%event_id, player_id = %player.id, "new player registered");

    let response = RegisterPlayerResponse {
        player_id: player.id.clone(),
        name: player.name.clone(),
        role: player.role,
    };
    let summary = PlayerSummary::from(&player);

    if is_active(state, event_id).await {
        state
            .update_organizer(|organizer| {
                organizer.roster.insert(player);
                Ok(())
            })
            .await?;
    }
    sse_events::broadcast_checkin_new_player(state, event_id, summary);

    Ok(response)
}

/// Pull confirmations and registrations of an event into the roster.
///
/// Defaults to the active event.
pub async fn sync_event(
    state: &SharedState,
    event_id: Option<Uuid>,
) -> Result<SyncEventResponse, ServiceError> {
    let event_id = match event_id {
        Some(id) => id,
        None => state
            .read_organizer(|organizer| organizer.checkin.active_event_id())
            .await
            .ok_or_else(|| ServiceError::InvalidState("no active check-in event".into()))?,
    };
    let event = load_event(state, event_id).await?;

    let (confirmed_count, new_player_count) = state
        .update_organizer(|organizer| {
            let confirmed = event
                .confirmations
                .keys()
                .filter(|id| organizer.roster.mark_present(id) == Some(true))
                .count();

            let mut added = 0;
            for (id, registration) in &event.new_players {
                if organizer.roster.contains(id) {
                    continue;
                }
                let Some(name) = normalize_name(&registration.name) else {
                    continue;
                };
                if organizer
                    .roster
                    .insert(Player::with_id(id.clone(), name, registration.role))
                {
                    added += 1;
                }
            }
            Ok((confirmed, added))
        })
        .await?;

    let message = sync_summary(confirmed_count, new_player_count);
    info!(%event_id, confirmed_count, new_player_count, "check-in event synced");
    state
        .read_organizer(|organizer| sse_events::broadcast_roster_updated(state, &organizer.roster))
        .await;

    Ok(SyncEventResponse {
        event_id,
        confirmed_count,
        new_player_count,
        message,
    })
}

/// Deactivate the event when it is active, otherwise make it the active one.
pub async fn toggle_event(
    state: &SharedState,
    event_id: Uuid,
) -> Result<EventActivationResponse, ServiceError> {
    let active = state
        .update_organizer(|organizer| Ok(organizer.checkin.toggle(event_id)))
        .await?;
    Ok(EventActivationResponse { event_id, active })
}

/// Activate an event from a pasted identifier, adding it to the history when missing.
pub async fn reactivate_event(
    state: &SharedState,
    raw_id: &str,
) -> Result<EventActivationResponse, ServiceError> {
    let raw_id = raw_id.trim();
    let event_id = Uuid::parse_str(raw_id)
        .map_err(|_| ServiceError::InvalidInput(format!("`{raw_id}` is not an event id")))?;
    let limit = state.config().event_history_limit;

    state
        .update_organizer(|organizer| {
            organizer.checkin.activate(event_id);
            organizer
                .checkin
                .remember(event_id, SystemTime::now(), limit);
            Ok(())
        })
        .await?;

    info!(%event_id, "check-in event reactivated");
    Ok(EventActivationResponse {
        event_id,
        active: true,
    })
}

/// Recently shared events and the active one.
pub async fn event_history(state: &SharedState) -> EventHistoryResponse {
    state
        .read_organizer(|organizer| {
            EventHistoryResponse::new(
                organizer.checkin.active_event_id(),
                organizer.checkin.history(),
            )
        })
        .await
}

fn sync_summary(confirmed: usize, added: usize) -> String {
    let mut parts = Vec::new();
    if confirmed > 0 {
        parts.push(format!("{confirmed} new confirmation(s)"));
    }
    if added > 0 {
        parts.push(format!("{added} new player(s)"));
    }
    if parts.is_empty() {
        "no updates found".into()
    } else {
        parts.join(", ")
    }
}

async fn load_event(
    state: &SharedState,
    event_id: Uuid,
) -> Result<CheckInEventEntity, ServiceError> {
    let store = state.require_roster_store().await?;
    store
        .find_event(event_id)
        .await?
        .ok_or_else(|| event_not_found(event_id))
}

async fn is_active(state: &SharedState, event_id: Uuid) -> bool {
    state
        .read_organizer(|organizer| organizer.checkin.is_active(event_id))
        .await
}

fn event_not_found(event_id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("check-in event `{event_id}`"))
}
