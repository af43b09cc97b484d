//! CouchDB-backed storage for durable session records.

/// Environment-driven connection settings.
pub mod config;
/// CouchDB DAO errors.
pub mod error;
/// Document shapes stored in CouchDB.
pub mod models;
/// HTTP client implementing the session store.
pub mod store;

pub use config::CouchConfig;
pub use error::CouchDaoError;
pub use store::CouchSessionStore;

use crate::dao::storage::StorageError;

impl From<CouchDaoError> for StorageError {
    fn from(err: CouchDaoError) -> Self {
        match err {
            CouchDaoError::MissingSession { id } => StorageError::Missing(id),
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
