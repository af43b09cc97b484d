use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::board::Symbol;

/// Lifecycle status shared by the durable record and the live state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// Only the creator is seated.
    Create,
    /// Both seats are filled, no move played yet.
    Init,
    /// At least one move has been accepted and the game is not decided.
    InProgress,
    /// Terminal outcome reached (win or draw).
    Finish,
}

/// Durable projection of a session: identity, participants and terminal outcome.
///
/// The board and the last move only live in the cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionEntity {
    /// Identifier assigned by the store on insert.
    pub id: Uuid,
    /// Name of the creator.
    pub player1: String,
    /// Name of the joiner, once seated.
    pub player2: Option<String>,
    /// Symbol held by the creator.
    pub player1_symbol: Symbol,
    /// Symbol held by the joiner.
    pub player2_symbol: Symbol,
    /// Name of the player expected to move next.
    pub turn: String,
    /// Player who created the session.
    pub created_by: String,
    /// Player behind the latest mutation.
    pub updated_by: String,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Last mutation timestamp.
    pub updated_at: SystemTime,
    /// Current lifecycle status.
    pub status: SessionStatus,
    /// True once a terminal outcome is reached.
    pub is_over: bool,
    /// True when the terminal outcome is a draw.
    pub is_draw: bool,
    /// Winning player name, absent on draws and unfinished sessions.
    pub winner: Option<String>,
}

impl SessionEntity {
    /// Identity of a freshly created session seating only `creator`.
    ///
    /// The id is a placeholder until the store assigns the real one on insert.
    pub fn created_by(creator: String, now: SystemTime) -> Self {
        Self {
            id: Uuid::nil(),
            player1: creator.clone(),
            player2: None,
            player1_symbol: Symbol::X,
            player2_symbol: Symbol::O,
            turn: creator.clone(),
            created_by: creator.clone(),
            updated_by: creator,
            created_at: now,
            updated_at: now,
            status: SessionStatus::Create,
            is_over: false,
            is_draw: false,
            winner: None,
        }
    }

    /// Whether both seats are taken.
    pub fn is_full(&self) -> bool {
        self.player2.is_some()
    }
}
