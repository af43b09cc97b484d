use std::{future::ready, sync::Arc, time::Duration};

use dashmap::DashMap;
use futures::future::BoxFuture;
use tokio::time::Instant;

use super::{CacheBackend, CacheResult};

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Process-local [`CacheBackend`] with lazy expiration.
///
/// Expired entries are dropped when touched and by [`MemoryCache::purge_expired`].
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before.saturating_sub(self.entries.len())
    }

    fn live_value(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                return Some(entry.value.clone());
            }
        }
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        None
    }
}

impl CacheBackend for MemoryCache {
    fn set(&self, key: String, value: String, ttl: Duration) -> BoxFuture<'static, CacheResult<()>> {
        let expires_at = Instant::now() + ttl;
        self.entries.insert(key, CacheEntry { value, expires_at });
        Box::pin(ready(Ok(())))
    }

    fn get(&self, key: String) -> BoxFuture<'static, CacheResult<Option<String>>> {
        Box::pin(ready(Ok(self.live_value(&key))))
    }

    fn exists(&self, key: String) -> BoxFuture<'static, CacheResult<bool>> {
        Box::pin(ready(Ok(self.live_value(&key).is_some())))
    }

    fn refresh_ttl(&self, key: String, ttl: Duration) -> BoxFuture<'static, CacheResult<bool>> {
        let now = Instant::now();
        let refreshed = match self.entries.get_mut(&key) {
            Some(mut entry) if entry.is_live(now) => {
                entry.expires_at = now + ttl;
                true
            }
            _ => false,
        };
        Box::pin(ready(Ok(refreshed)))
    }
}
