use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::CouchDaoError;
use crate::{
    dao::models::{SessionEntity, SessionStatus},
    state::board::Symbol,
};

/// Prefix of every session document id.
pub const SESSION_PREFIX: &str = "session::";

/// Build the CouchDB document identifier for a session.
pub fn session_doc_id(id: Uuid) -> String {
    format!("{SESSION_PREFIX}{id}")
}

fn parse_session_doc_id(doc_id: &str) -> Result<Uuid, CouchDaoError> {
    doc_id
        .strip_prefix(SESSION_PREFIX)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| CouchDaoError::InvalidDocId {
            doc_id: doc_id.to_owned(),
        })
}

/// Session document with CouchDB's bookkeeping fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchSessionDocument {
    /// Document id, see [`session_doc_id`].
    #[serde(rename = "_id")]
    pub id: String,
    /// Revision required by CouchDB to update the document.
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// Session identity fields.
    #[serde(flatten)]
    pub session: SessionBody,
}

/// Identity fields of [`SessionEntity`] minus the id.
#[allow(missing_docs)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionBody {
    pub player1: String,
    pub player2: Option<String>,
    pub player1_symbol: Symbol,
    pub player2_symbol: Symbol,
    pub turn: String,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
    pub status: SessionStatus,
    pub is_over: bool,
    pub is_draw: bool,
    pub winner: Option<String>,
}

impl From<(SessionEntity, Option<String>)> for CouchSessionDocument {
    fn from((session, rev): (SessionEntity, Option<String>)) -> Self {
        Self {
            id: session_doc_id(session.id),
            rev,
            session: SessionBody {
                player1: session.player1,
                player2: session.player2,
                player1_symbol: session.player1_symbol,
                player2_symbol: session.player2_symbol,
                turn: session.turn,
                created_by: session.created_by,
                updated_by: session.updated_by,
                created_at: session.created_at,
                updated_at: session.updated_at,
                status: session.status,
                is_over: session.is_over,
                is_draw: session.is_draw,
                winner: session.winner,
            },
        }
    }
}

impl TryFrom<CouchSessionDocument> for SessionEntity {
    type Error = CouchDaoError;

    fn try_from(value: CouchSessionDocument) -> Result<Self, Self::Error> {
        let id = parse_session_doc_id(&value.id)?;
        let body = value.session;
        Ok(Self {
            id,
            player1: body.player1,
            player2: body.player2,
            player1_symbol: body.player1_symbol,
            player2_symbol: body.player2_symbol,
            turn: body.turn,
            created_by: body.created_by,
            updated_by: body.updated_by,
            created_at: body.created_at,
            updated_at: body.updated_at,
            status: body.status,
            is_over: body.is_over,
            is_draw: body.is_draw,
            winner: body.winner,
        })
    }
}
