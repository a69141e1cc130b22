use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::checkin::{
        ConfirmationResponse, CreateEventResponse, EventActivationResponse, EventHistoryResponse,
        EventRosterResponse, ReactivateEventRequest, RegisterPlayerRequest,
        RegisterPlayerResponse, SyncEventRequest, SyncEventResponse,
    },
    error::AppError,
    services::checkin_service,
    state::SharedState,
};

/// Check-in endpoints: organizer side (events, sync) and invitee side (roster, confirm, register).
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/events", get(event_history).post(create_event))
        .route("/events/sync", post(sync_event))
        .route("/events/reactivate", post(reactivate_event))
        .route("/events/{id}/toggle", post(toggle_event))
        .route("/events/{id}/roster", get(event_roster))
        .route(
            "/events/{id}/confirm/{player_id}",
            post(confirm_attendance),
        )
        .route("/events/{id}/players", post(register_new_player))
}

/// Share the current roster as a new, active check-in event.
#[utoipa::path(
    post,
    path = "/events",
    tag = "checkin",
    responses(
        (status = 201, description = "Event created with its invitation", body = CreateEventResponse),
        (status = 400, description = "Roster is empty")
    )
)]
pub async fn create_event(
    State(state): State<SharedState>,
) -> Result<(StatusCode, Json<CreateEventResponse>), AppError> {
    let created = checkin_service::create_event(&state).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Recently shared events and the active one.
#[utoipa::path(
    get,
    path = "/events",
    tag = "checkin",
    responses((status = 200, description = "Event history", body = EventHistoryResponse))
)]
pub async fn event_history(State(state): State<SharedState>) -> Json<EventHistoryResponse> {
    Json(checkin_service::event_history(&state).await)
}

/// Pull confirmations and registrations into the roster.
#[utoipa::path(
    post,
    path = "/events/sync",
    tag = "checkin",
    request_body(content = SyncEventRequest, description = "Defaults to the active event"),
    responses(
        (status = 200, description = "Roster updated", body = SyncEventResponse),
        (status = 404, description = "Unknown event"),
        (status = 409, description = "No active event")
    )
)]
pub async fn sync_event(
    State(state): State<SharedState>,
    payload: Option<Json<SyncEventRequest>>,
) -> Result<Json<SyncEventResponse>, AppError> {
    let request = payload
        .map(|Json(request)| request)
        .unwrap_or_default();
    Ok(Json(
        checkin_service::sync_event(&state, request.event_id).await?,
    ))
}

/// Activate a manually entered event identifier.
#[utoipa::path(
    post,
    path = "/events/reactivate",
    tag = "checkin",
    request_body = ReactivateEventRequest,
    responses(
        (status = 200, description = "Event is active", body = EventActivationResponse),
        (status = 400, description = "Not an event identifier")
    )
)]
pub async fn reactivate_event(
    State(state): State<SharedState>,
    Json(payload): Json<ReactivateEventRequest>,
) -> Result<Json<EventActivationResponse>, AppError> {
    Ok(Json(
        checkin_service::reactivate_event(&state, &payload.event_id).await?,
    ))
}

/// Toggle whether confirmations of an event flow straight into the roster.
#[utoipa::path(
    post,
    path = "/events/{id}/toggle",
    tag = "checkin",
    params(("id" = Uuid, Path, description = "Event identifier")),
    responses((status = 200, description = "Activation flag", body = EventActivationResponse))
)]
pub async fn toggle_event(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventActivationResponse>, AppError> {
    Ok(Json(checkin_service::toggle_event(&state, id).await?))
}

/// Players an invitee can pick from, with their confirmation links.
#[utoipa::path(
    get,
    path = "/events/{id}/roster",
    tag = "checkin",
    params(("id" = Uuid, Path, description = "Event identifier")),
    responses(
        (status = 200, description = "Event snapshot", body = EventRosterResponse),
        (status = 404, description = "Unknown event")
    )
)]
pub async fn event_roster(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventRosterResponse>, AppError> {
    Ok(Json(checkin_service::event_roster(&state, id).await?))
}

/// Confirm attendance of a player listed in the event.
#[utoipa::path(
    post,
    path = "/events/{id}/confirm/{player_id}",
    tag = "checkin",
    params(
        ("id" = Uuid, Path, description = "Event identifier"),
        ("player_id" = String, Path, description = "Player picked by the invitee")
    ),
    responses(
        (status = 200, description = "Confirmation recorded", body = ConfirmationResponse),
        (status = 404, description = "Unknown event or player")
    )
)]
pub async fn confirm_attendance(
    State(state): State<SharedState>,
    Path((id, player_id)): Path<(Uuid, String)>,
) -> Result<Json<ConfirmationResponse>, AppError> {
    Ok(Json(
        checkin_service::confirm_attendance(&state, id, &player_id).await?,
    ))
}

/// Register someone who is not listed in the event.
#[utoipa::path(
    post,
    path = "/events/{id}/players",
    tag = "checkin",
    params(("id" = Uuid, Path, description = "Event identifier")),
    request_body = RegisterPlayerRequest,
    responses(
        (status = 201, description = "Player registered", body = RegisterPlayerResponse),
        (status = 404, description = "Unknown event")
    )
)]
pub async fn register_new_player(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<RegisterPlayerRequest>>,
) -> Result<(StatusCode, Json<RegisterPlayerResponse>), AppError> {
    let registered = checkin_service::register_new_player(&state, id, payload).await?;
    Ok((StatusCode::CREATED, Json(registered)))
}
