/// CouchDB-backed session store.
#[cfg(feature = "couch-store")]
pub mod couchdb;
/// In-process session store.
pub mod memory;
/// MongoDB-backed session store.
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::SessionEntity;
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

pub use memory::MemorySessionStore;

/// Abstraction over the persistence layer holding durable session records.
///
/// Each call is atomic on its own; the store never deletes a session.
pub trait SessionStore: Send + Sync {
    /// Persist a new record and return the identifier the store assigned to it.
    fn insert(&self, session: SessionEntity) -> BoxFuture<'static, StorageResult<Uuid>>;
    /// Look a record up by identifier.
    fn find_by_id(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>>;
    /// Replace an existing record. Fails with [`StorageError::Missing`] for unknown ids.
    ///
    /// [`StorageError::Missing`]: crate::dao::storage::StorageError::Missing
    fn update(&self, session: SessionEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap round trip proving the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection in place after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
