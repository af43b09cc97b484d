//! Ephemeral storage for the live state of active sessions.
//!
//! [`CacheBackend`] is the raw key/value capability with expiration; [`LiveStateCache`] layers
//! the session key scheme and JSON encoding of [`LiveSession`] on top of it.

/// In-process cache backend.
pub mod memory;

use std::{error::Error, sync::Arc, time::Duration};

use futures::future::BoxFuture;
use thiserror::Error;
use uuid::Uuid;

use crate::state::session::LiveSession;

pub use memory::MemoryCache;

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Failures raised while reading or writing live state.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend could not serve the request.
    #[error("cache unavailable: {message}")]
    Unavailable {
        /// Human readable context.
        message: String,
        /// Backend failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// Live state could not be encoded before writing.
    #[error("failed to encode live state for `{key}`")]
    Encode {
        /// Cache key being written.
        key: String,
        /// Encoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// Stored value is not a valid live state.
    #[error("failed to decode live state stored under `{key}`")]
    Decode {
        /// Cache key being read.
        key: String,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
}

impl CacheError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        CacheError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}

/// Key/value store whose entries lapse after a time-to-live.
pub trait CacheBackend: Send + Sync {
    /// Store `value` under `key`, replacing any previous value and resetting its TTL.
    fn set(&self, key: String, value: String, ttl: Duration) -> BoxFuture<'static, CacheResult<()>>;
    /// Read the value under `key` unless it expired.
    fn get(&self, key: String) -> BoxFuture<'static, CacheResult<Option<String>>>;
    /// Whether a live value exists under `key`.
    fn exists(&self, key: String) -> BoxFuture<'static, CacheResult<bool>>;
    /// Restart the TTL of `key`. Returns `false` when the key is absent.
    fn refresh_ttl(&self, key: String, ttl: Duration) -> BoxFuture<'static, CacheResult<bool>>;
}

/// Typed access to the live state of sessions, keyed by `<prefix><session id>`.
#[derive(Clone)]
pub struct LiveStateCache {
    backend: Arc<dyn CacheBackend>,
    prefix: Arc<str>,
    ttl: Duration,
}

impl LiveStateCache {
    /// Wrap `backend`, writing entries that expire after `ttl`.
    pub fn new(backend: Arc<dyn CacheBackend>, prefix: impl Into<Arc<str>>, ttl: Duration) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
            ttl,
        }
    }

    /// Cache key for a session.
    pub fn key(&self, id: Uuid) -> String {
        format!("{}{}", self.prefix, id)
    }

    /// Time-to-live applied on every write.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Load the live state of `id`, `None` once it expired.
    pub async fn get(&self, id: Uuid) -> CacheResult<Option<LiveSession>> {
        let key = self.key(id);
        let Some(raw) = self.backend.get(key.clone()).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| CacheError::Decode { key, source })
    }

    /// Whether live state for `id` is still present.
    pub async fn exists(&self, id: Uuid) -> CacheResult<bool> {
        self.backend.exists(self.key(id)).await
    }

    /// Write `session` and restart its TTL.
    pub async fn put(&self, session: &LiveSession) -> CacheResult<()> {
        let key = self.key(session.id());
        let raw = serde_json::to_string(session).map_err(|source| CacheError::Encode {
            key: key.clone(),
            source,
        })?;
        self.backend.set(key, raw, self.ttl).await
    }
}
