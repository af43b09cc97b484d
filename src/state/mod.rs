/// Board rules and outcome evaluation.
pub mod board;
/// Per-session mutual exclusion.
pub mod locks;
/// Viewer connections and snapshot fan-out.
pub mod registry;
/// Live session state and move recording.
pub mod session;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{
        models::SessionEntity,
        session_cache::{CacheBackend, LiveStateCache},
        session_store::SessionStore,
    },
    error::ServiceError,
};

use self::{locks::SessionLocks, registry::BroadcastRegistry};

/// Handle to the application state shared by handlers and background tasks.
pub type SharedState = Arc<AppState>;

/// Central application state: store handles, viewer registry and per-session locks.
pub struct AppState {
    config: Arc<AppConfig>,
    session_store: RwLock<Option<Arc<dyn SessionStore>>>,
    cache: LiveStateCache,
    registry: BroadcastRegistry,
    locks: SessionLocks,
    pending_outcomes: DashMap<Uuid, SessionEntity>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a session store is installed.
    pub fn new(config: AppConfig, cache_backend: Arc<dyn CacheBackend>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let cache = LiveStateCache::new(
            cache_backend,
            config.cache_key_prefix(),
            config.session_ttl(),
        );
        Arc::new(Self {
            config: Arc::new(config),
            session_store: RwLock::new(None),
            cache,
            registry: BroadcastRegistry::new(),
            locks: SessionLocks::new(),
            pending_outcomes: DashMap::new(),
            degraded: degraded_tx,
        })
    }

    /// Shared runtime configuration.
    pub fn config(&self) -> Arc<AppConfig> {
        self.config.clone()
    }

    /// Obtain a handle to the current session store, if one is installed.
    pub async fn session_store(&self) -> Option<Arc<dyn SessionStore>> {
        let guard = self.session_store.read().await;
        guard.as_ref().cloned()
    }

    /// Session store usable right now, or [`ServiceError::Degraded`].
    pub async fn require_session_store(&self) -> Result<Arc<dyn SessionStore>, ServiceError> {
        if self.is_degraded().await {
            return Err(ServiceError::Degraded);
        }
        self.session_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new session store implementation and leave degraded mode.
    pub async fn set_session_store(&self, store: Arc<dyn SessionStore>) {
        {
            let mut guard = self.session_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current session store and enter degraded mode.
    pub async fn clear_session_store(&self) {
        {
            let mut guard = self.session_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Live state cache.
    pub fn cache(&self) -> &LiveStateCache {
        &self.cache
    }

    /// Viewer connections per session.
    pub fn registry(&self) -> &BroadcastRegistry {
        &self.registry
    }

    /// Per-session mutual exclusion.
    pub fn locks(&self) -> &SessionLocks {
        &self.locks
    }

    /// Terminal identities whose durable write failed and awaits a retry.
    pub fn pending_outcomes(&self) -> &DashMap<Uuid, SessionEntity> {
        &self.pending_outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::{session_cache::MemoryCache, session_store::MemorySessionStore};

    #[tokio::test]
    async fn degraded_until_a_store_is_installed() {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryCache::new()));
        let mut watcher = state.degraded_watcher();
        assert!(state.is_degraded().await);
        assert!(matches!(
            state.require_session_store().await,
            Err(ServiceError::Degraded)
        ));

        state
            .set_session_store(Arc::new(MemorySessionStore::new()))
            .await;
        assert!(watcher.has_changed().unwrap());
        assert!(!*watcher.borrow_and_update());
        assert!(state.require_session_store().await.is_ok());

        state.clear_session_store().await;
        assert!(state.is_degraded().await);
        assert!(state.session_store().await.is_none());
    }
}
