use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{dto::session::SessionSnapshot, error::ErrorKind};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
/// Messages accepted from viewer WebSocket clients.
#[serde(tag = "type")]
pub enum ViewerInboundMessage {
    /// Submit a move, same semantics as `POST /games/{id}/moves`.
    #[serde(rename = "move")]
    Move {
        /// Name of the player claiming the turn.
        turn: String,
        /// `[row, col]`.
        #[serde(rename = "move")]
        coordinates: Vec<i64>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
/// Messages pushed to viewer WebSocket clients.
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerOutboundMessage {
    /// Latest state of the session.
    Snapshot(SessionSnapshot),
    /// Another viewer connected to the session.
    ParticipantJoined {
        /// Number of viewers now connected, the newcomer included.
        viewers: usize,
    },
    /// A request sent over this connection was rejected.
    Error {
        /// Machine readable failure kind.
        kind: ErrorKind,
        /// Human readable description.
        message: String,
    },
}
