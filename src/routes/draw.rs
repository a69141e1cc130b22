use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::draw::{DrawResponse, DrawTeamsRequest},
    error::AppError,
    services::draw_service,
    state::SharedState,
};

/// Team draw endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/teams/draw", post(draw_teams))
        .route("/teams/last", get(last_draw))
}

/// Split the present players into balanced teams.
#[utoipa::path(
    post,
    path = "/teams/draw",
    tag = "teams",
    request_body = DrawTeamsRequest,
    responses(
        (status = 200, description = "Drawn teams", body = DrawResponse),
        (status = 400, description = "Team count or roster composition rejected")
    )
)]
pub async fn draw_teams(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<DrawTeamsRequest>>,
) -> Result<Json<DrawResponse>, AppError> {
    Ok(Json(draw_service::draw_teams(&state, payload).await?))
}

/// Return the latest successful draw.
#[utoipa::path(
    get,
    path = "/teams/last",
    tag = "teams",
    responses(
        (status = 200, description = "Latest draw", body = DrawResponse),
        (status = 404, description = "Nothing drawn yet")
    )
)]
pub async fn last_draw(State(state): State<SharedState>) -> Result<Json<DrawResponse>, AppError> {
    Ok(Json(draw_service::last_draw(&state).await?))
}
