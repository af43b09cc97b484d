use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::{
    dao::{session_cache::CacheError, storage::StorageError},
    state::board::BoardError,
};

/// Machine readable category of a failure, shared by HTTP bodies and WebSocket error frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No durable record for the session.
    NotFound,
    /// The durable record exists but the live state lapsed.
    Expired,
    /// The session already reached a terminal outcome.
    GameOver,
    /// Both seats are taken.
    GameFull,
    /// The turn claim does not match the player expected to move.
    NotYourTurn,
    /// Malformed coordinates or occupied cell.
    InvalidMove,
    /// Request payload failed validation.
    InvalidInput,
    /// A backing store failed or is not installed; the caller may retry.
    Unavailable,
}

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Durable storage backend failed.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Live state cache failed.
    #[error("cache unavailable")]
    Cache(#[source] CacheError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// No session with this identifier.
    #[error("Game not found")]
    NotFound(Uuid),
    /// Session exists but its live state expired.
    #[error("Game has expired")]
    Expired(Uuid),
    /// Session already finished.
    #[error("Game is over")]
    GameOver,
    /// Both seats are taken.
    #[error("Game is full")]
    GameFull,
    /// Turn claim rejected.
    #[error("It's not your turn")]
    NotYourTurn,
    /// Move rejected by the board.
    #[error("Invalid move: {0}")]
    InvalidMove(String),
}

impl ServiceError {
    /// Category reported to clients.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Unavailable(_) | ServiceError::Cache(_) | ServiceError::Degraded => {
                ErrorKind::Unavailable
            }
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::Expired(_) => ErrorKind::Expired,
            ServiceError::GameOver => ErrorKind::GameOver,
            ServiceError::GameFull => ErrorKind::GameFull,
            ServiceError::NotYourTurn => ErrorKind::NotYourTurn,
            ServiceError::InvalidMove(_) => ErrorKind::InvalidMove,
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<CacheError> for ServiceError {
    fn from(err: CacheError) -> Self {
        ServiceError::Cache(err)
    }
}

impl From<BoardError> for ServiceError {
    fn from(err: BoardError) -> Self {
        ServiceError::InvalidMove(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Failure raised by the session lifecycle.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl AppError {
    /// Category reported to clients.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::BadRequest(_) => ErrorKind::InvalidInput,
            AppError::Service(err) => err.kind(),
        }
    }

    /// HTTP status matching [`AppError::kind`].
    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound | ErrorKind::Expired => StatusCode::NOT_FOUND,
            ErrorKind::GameOver
            | ErrorKind::GameFull
            | ErrorKind::NotYourTurn
            | ErrorKind::InvalidMove
            | ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Machine readable category.
    pub kind: ErrorKind,
    /// Human readable description.
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let payload = Json(ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
