use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Per-session mutual exclusion.
///
/// Read-modify-write cycles on the same session run one at a time while distinct sessions
/// proceed in parallel. Entries are dropped once nobody holds or waits on them.
#[derive(Default)]
pub struct SessionLocks {
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

/// Exclusive access to one session, released on drop.
pub struct SessionGuard {
    id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until `id` is free and take it.
    pub async fn acquire(&self, id: Uuid) -> SessionGuard {
        let lock = self
            .locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;
        SessionGuard {
            id,
            guard: Some(guard),
            locks: self.locks.clone(),
        }
    }

    /// Number of sessions with a live lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no session currently holds a lock entry.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        // Release first so the table holds the only remaining reference when idle.
        self.guard.take();
        self.locks
            .remove_if(&self.id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
