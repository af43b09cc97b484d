use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::SessionStatus,
    dto::{format_system_time, validation::validate_player_name},
    state::{
        board::{Board, Symbol},
        session::LiveSession,
    },
};

/// Payload used to open a new session.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateSessionRequest {
    /// Display name of the creator, who plays `X`.
    #[validate(custom(function = "validate_player_name"))]
    pub player: String,
}

/// Payload used to take the second seat of an existing session.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinSessionRequest {
    /// Display name of the joiner, who plays `O`.
    #[validate(custom(function = "validate_player_name"))]
    pub player: String,
}

/// A move submitted by the player whose turn it claims to be.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct MoveRequest {
    /// Name of the player claiming the turn.
    pub turn: String,
    /// `[row, col]`, each in `[0, 2]`.
    #[serde(rename = "move")]
    pub coordinates: Vec<i64>,
}

/// Full view of a session's live state, returned to callers and pushed to viewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SessionSnapshot {
    /// Session identifier.
    pub id: Uuid,
    /// Creator, playing `player1_symbol`.
    pub player1: String,
    /// Joiner, absent until the second seat is taken.
    pub player2: Option<String>,
    /// Symbol of the creator.
    pub player1_symbol: Symbol,
    /// Symbol of the joiner.
    pub player2_symbol: Symbol,
    /// Player expected to move next.
    pub turn: String,
    /// Player who opened the session.
    pub created_by: String,
    /// Player behind the latest change.
    pub updated_by: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp.
    pub updated_at: String,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Set once the session has a terminal outcome.
    pub is_over: bool,
    /// Set when the terminal outcome is a draw.
    pub is_draw: bool,
    /// Winner's name; absent on a draw or while play continues.
    pub winner: Option<String>,
    /// Rows of cells, each `""`, `"X"` or `"O"`.
    #[schema(value_type = Vec<Vec<String>>)]
    pub board: Board,
    /// `[row, col]` of the latest accepted move.
    pub last_move: Option<[usize; 2]>,
}

impl From<LiveSession> for SessionSnapshot {
    fn from(session: LiveSession) -> Self {
        let LiveSession {
            identity,
            board,
            last_move,
        } = session;
        Self {
            id: identity.id,
            player1: identity.player1,
            player2: identity.player2,
            player1_symbol: identity.player1_symbol,
            player2_symbol: identity.player2_symbol,
            turn: identity.turn,
            created_by: identity.created_by,
            updated_by: identity.updated_by,
            created_at: format_system_time(identity.created_at),
            updated_at: format_system_time(identity.updated_at),
            status: identity.status,
            is_over: identity.is_over,
            is_draw: identity.is_draw,
            winner: identity.winner,
            board,
            last_move: last_move.map(|cell| [cell.row(), cell.col()]),
        }
    }
}
