use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::MongoDaoError;
use crate::{
    dao::models::{SessionEntity, SessionStatus},
    state::board::Symbol,
};

/// Shape of a session as stored in the `sessions` collection.
///
/// The identifier is kept as its hyphenated string form so lookups do not depend on the
/// driver's UUID representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSessionDocument {
    #[serde(rename = "_id")]
    id: String,
    player1: String,
    player2: Option<String>,
    player1_symbol: Symbol,
    player2_symbol: Symbol,
    turn: String,
    created_by: String,
    updated_by: String,
    created_at: DateTime,
    updated_at: DateTime,
    status: SessionStatus,
    is_over: bool,
    is_draw: bool,
    winner: Option<String>,
}

impl From<SessionEntity> for MongoSessionDocument {
    fn from(value: SessionEntity) -> Self {
        Self {
            id: value.id.to_string(),
            player1: value.player1,
            player2: value.player2,
            player1_symbol: value.player1_symbol,
            player2_symbol: value.player2_symbol,
            turn: value.turn,
            created_by: value.created_by,
            updated_by: value.updated_by,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
            status: value.status,
            is_over: value.is_over,
            is_draw: value.is_draw,
            winner: value.winner,
        }
    }
}

impl TryFrom<MongoSessionDocument> for SessionEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoSessionDocument) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&value.id)
            .map_err(|_| MongoDaoError::CorruptSession { id: value.id.clone() })?;
        Ok(Self {
            id,
            player1: value.player1,
            player2: value.player2,
            player1_symbol: value.player1_symbol,
            player2_symbol: value.player2_symbol,
            turn: value.turn,
            created_by: value.created_by,
            updated_by: value.updated_by,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
            status: value.status,
            is_over: value.is_over,
            is_draw: value.is_draw,
            winner: value.winner,
        })
    }
}

/// Filter matching the document of session `id`.
pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}
