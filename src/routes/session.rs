use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::session::{CreateSessionRequest, JoinSessionRequest, MoveRequest, SessionSnapshot},
    error::{AppError, ErrorBody},
    services::session_service,
    state::SharedState,
};

/// Routes driving the session lifecycle.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", post(create_session))
        .route("/games/{id}", post(join_session).get(get_session))
        .route("/games/{id}/moves", post(submit_move))
}

/// Open a new session seating the requester as `X`.
#[utoipa::path(
    post,
    path = "/games",
    tag = "sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created", body = SessionSnapshot),
        (status = 400, description = "Invalid player name", body = ErrorBody),
        (status = 503, description = "Storage unavailable", body = ErrorBody)
    )
)]
pub async fn create_session(
    State(state): State<SharedState>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    payload.validate()?;
    let snapshot = session_service::create_or_join(&state, payload.player, None).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// Take the second seat of an existing session as `O`.
#[utoipa::path(
    post,
    path = "/games/{id}",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Identifier of the session to join")),
    request_body = JoinSessionRequest,
    responses(
        (status = 201, description = "Session joined", body = SessionSnapshot),
        (status = 400, description = "Session full or over", body = ErrorBody),
        (status = 404, description = "Session unknown or expired", body = ErrorBody)
    )
)]
pub async fn join_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<JoinSessionRequest>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    payload.validate()?;
    let snapshot = session_service::create_or_join(&state, payload.player, Some(id)).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// Current live state of a session.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Identifier of the session")),
    responses(
        (status = 200, description = "Current snapshot", body = SessionSnapshot),
        (status = 404, description = "Session unknown or expired", body = ErrorBody)
    )
)]
pub async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = session_service::get_snapshot(&state, id).await?;
    Ok(Json(snapshot))
}

/// Play a move and push the resulting snapshot to every viewer.
#[utoipa::path(
    post,
    path = "/games/{id}/moves",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Identifier of the session")),
    request_body = MoveRequest,
    responses(
        (status = 200, description = "Move accepted", body = SessionSnapshot),
        (status = 400, description = "Move rejected", body = ErrorBody),
        (status = 404, description = "Session unknown or expired", body = ErrorBody)
    )
)]
pub async fn submit_move(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MoveRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot =
        session_service::apply_move(&state, &payload.turn, &payload.coordinates, id).await?;
    Ok(Json(snapshot))
}
