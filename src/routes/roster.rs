use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use axum_valid::Valid;

use crate::{
    dto::roster::{
        CreatePlayerRequest, PlayerSummary, PresenceResponse, RosterResponse, UpdatePlayerRequest,
    },
    error::AppError,
    services::roster_service,
    state::SharedState,
};

/// Roster management endpoints used by the organizer.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/players",
            get(list_players).post(add_player).delete(clear_roster),
        )
        .route("/players/{id}", put(update_player).delete(remove_player))
        .route("/players/{id}/presence", post(toggle_presence))
}

/// List every player in roster order.
#[utoipa::path(
    get,
    path = "/players",
    tag = "roster",
    responses((status = 200, description = "Current roster", body = RosterResponse))
)]
pub async fn list_players(State(state): State<SharedState>) -> Json<RosterResponse> {
    Json(roster_service::list_players(&state).await)
}

/// Add a player, present by default.
#[utoipa::path(
    post,
    path = "/players",
    tag = "roster",
    request_body = CreatePlayerRequest,
    responses(
        (status = 201, description = "Player created", body = PlayerSummary),
        (status = 400, description = "Invalid name"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn add_player(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreatePlayerRequest>>,
) -> Result<(StatusCode, Json<PlayerSummary>), AppError> {
    let player = roster_service::add_player(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(player)))
}

/// Remove every player and forget the last draw.
#[utoipa::path(
    delete,
    path = "/players",
    tag = "roster",
    responses((status = 204, description = "Roster cleared"))
)]
pub async fn clear_roster(State(state): State<SharedState>) -> Result<StatusCode, AppError> {
    roster_service::clear_roster(&state).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Edit the name and/or role of a player.
#[utoipa::path(
    put,
    path = "/players/{id}",
    tag = "roster",
    params(("id" = String, Path, description = "Identifier of the player to edit")),
    request_body = UpdatePlayerRequest,
    responses(
        (status = 200, description = "Player updated", body = PlayerSummary),
        (status = 404, description = "Unknown player")
    )
)]
pub async fn update_player(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<UpdatePlayerRequest>>,
) -> Result<Json<PlayerSummary>, AppError> {
    Ok(Json(roster_service::update_player(&state, &id, payload).await?))
}

/// Remove a single player.
#[utoipa::path(
    delete,
    path = "/players/{id}",
    tag = "roster",
    params(("id" = String, Path, description = "Identifier of the player to remove")),
    responses(
        (status = 204, description = "Player removed"),
        (status = 404, description = "Unknown player")
    )
)]
pub async fn remove_player(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    roster_service::remove_player(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Flip whether a player takes part in the next draw.
#[utoipa::path(
    post,
    path = "/players/{id}/presence",
    tag = "roster",
    params(("id" = String, Path, description = "Identifier of the player")),
    responses(
        (status = 200, description = "New presence flag", body = PresenceResponse),
        (status = 404, description = "Unknown player")
    )
)]
pub async fn toggle_presence(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<PresenceResponse>, AppError> {
    Ok(Json(roster_service::toggle_presence(&state, &id).await?))
}
