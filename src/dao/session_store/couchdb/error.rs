//! Failures of the CouchDB session store.

use reqwest::StatusCode;
use thiserror::Error;
use uuid::Uuid;

/// Result alias for CouchDB operations.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// What went wrong while talking to CouchDB.
/// Variant fields are described by their display messages.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// Required environment variable is missing.
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// The HTTP client could not be built.
    #[error("failed to build CouchDB client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request against the database itself (probe or creation) failed in transit.
    #[error("failed to {action} CouchDB database `{database}`")]
    Database {
        database: String,
        action: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// A document request failed in transit.
    #[error("failed to send CouchDB request to `{path}`")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB answered with a status the store does not handle.
    #[error("unexpected CouchDB status {status} for `{path}`")]
    Status { path: String, status: StatusCode },
    /// A document body could not be decoded.
    #[error("failed to decode CouchDB document `{path}`")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// Updating a session that has no document yet.
    #[error("session `{id}` does not exist")]
    MissingSession { id: Uuid },
    /// Stored document id is not a session id.
    #[error("invalid document ID `{doc_id}`")]
    InvalidDocId { doc_id: String },
}
