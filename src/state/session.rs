use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    dao::models::{SessionEntity, SessionStatus},
    state::board::{Board, BoardError, Cell, Outcome, Symbol},
};

/// Authoritative state of an active session, as kept in the cache.
///
/// Carries the durable identity plus the board and the last accepted move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveSession {
    /// Identity fields mirrored from the durable record.
    #[serde(flatten)]
    pub identity: SessionEntity,
    /// Current grid.
    pub board: Board,
    /// Cell of the latest accepted move.
    pub last_move: Option<Cell>,
}

impl LiveSession {
    /// Fresh live state for `identity` with an empty board.
    pub fn from_identity(identity: SessionEntity) -> Self {
        Self {
            identity,
            board: Board::empty(),
            last_move: None,
        }
    }

    /// Session identifier.
    pub fn id(&self) -> Uuid {
        self.identity.id
    }

    /// Replace the identity fields while keeping the board and the move cursor.
    pub fn with_identity(self, identity: SessionEntity) -> Self {
        Self { identity, ..self }
    }

    /// Symbol played by `claimant`, once both seats are taken.
    pub fn acting_symbol(&self, claimant: &str) -> Option<Symbol> {
        let identity = &self.identity;
        let opponent = identity.player2.as_deref()?;
        if claimant == identity.player1 {
            Some(identity.player1_symbol)
        } else if claimant == opponent {
            Some(identity.player2_symbol)
        } else {
            None
        }
    }

    fn opponent_of(&self, claimant: &str) -> Option<&str> {
        let identity = &self.identity;
        if claimant == identity.player1 {
            identity.player2.as_deref()
        } else {
            Some(identity.player1.as_str())
        }
    }

    /// Place `symbol` for `claimant` and derive the next live state.
    ///
    /// The receiver is left untouched; an occupied cell fails without side effects.
    pub fn record_move(
        &self,
        claimant: &str,
        symbol: Symbol,
        cell: Cell,
        now: SystemTime,
    ) -> Result<(LiveSession, Outcome), BoardError> {
        let board = self.board.apply_move(cell, symbol)?;
        let outcome = board.evaluate(cell);

        let mut next = self.clone();
        next.board = board;
        next.last_move = Some(cell);

        let identity = &mut next.identity;
        identity.updated_by = claimant.to_owned();
        identity.updated_at = now;

        match outcome {
            Outcome::Won(_) => {
                identity.status = SessionStatus::Finish;
                identity.is_over = true;
                identity.is_draw = false;
                identity.winner = Some(claimant.to_owned());
            }
            Outcome::Draw => {
                identity.status = SessionStatus::Finish;
                identity.is_over = true;
                identity.is_draw = true;
                identity.winner = None;
            }
            Outcome::Ongoing => {
                identity.status = SessionStatus::InProgress;
                identity.is_over = false;
                identity.is_draw = false;
                if let Some(opponent) = self.opponent_of(claimant) {
                    identity.turn = opponent.to_owned();
                }
            }
        }

        Ok((next, outcome))
    }
}
