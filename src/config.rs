//! Application-level configuration loading: session timing, cache keys and viewer queues.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TICTACTOE_BACK_CONFIG_PATH";
/// Environment variable selecting the durable store.
const STORAGE_BACKEND_ENV: &str = "STORAGE_BACKEND";

const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30);
const DEFAULT_CACHE_KEY_PREFIX: &str = "GAME_";
const DEFAULT_VIEWER_CHANNEL_CAPACITY: usize = 32;
const DEFAULT_RECONCILE_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    session_ttl: Duration,
    cache_key_prefix: String,
    viewer_channel_capacity: usize,
    reconcile_interval: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        session_ttl_secs = app_config.session_ttl.as_secs(),
                        "loaded session settings from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// How long live state survives without a join or a move.
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Prefix prepended to session ids to build cache keys.
    pub fn cache_key_prefix(&self) -> &str {
        &self.cache_key_prefix
    }

    /// Outbound queue length per viewer connection.
    pub fn viewer_channel_capacity(&self) -> usize {
        self.viewer_channel_capacity
    }

    /// Period between retries of terminal outcomes that failed to persist.
    pub fn reconcile_interval(&self) -> Duration {
        self.reconcile_interval
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session_ttl: DEFAULT_SESSION_TTL,
            cache_key_prefix: DEFAULT_CACHE_KEY_PREFIX.to_owned(),
            viewer_channel_capacity: DEFAULT_VIEWER_CHANNEL_CAPACITY,
            reconcile_interval: DEFAULT_RECONCILE_INTERVAL,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
///
/// Every field is optional so partial files only override what they name.
struct RawConfig {
    session_ttl_secs: Option<u64>,
    cache_key_prefix: Option<String>,
    viewer_channel_capacity: Option<usize>,
    reconcile_interval_secs: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            session_ttl: value
                .session_ttl_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_ttl),
            cache_key_prefix: value
                .cache_key_prefix
                .unwrap_or(defaults.cache_key_prefix),
            viewer_channel_capacity: value
                .viewer_channel_capacity
                .filter(|capacity| *capacity > 0)
                .unwrap_or(defaults.viewer_channel_capacity),
            reconcile_interval: value
                .reconcile_interval_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.reconcile_interval),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Durable store selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// MongoDB via the official driver.
    #[cfg(feature = "mongo-store")]
    Mongo,
    /// CouchDB over its HTTP API.
    #[cfg(feature = "couch-store")]
    Couch,
    /// Process-local store, lost on restart.
    Memory,
}

impl StorageBackend {
    /// Read [`STORAGE_BACKEND_ENV`], defaulting to the first compiled-in database backend.
    pub fn from_env() -> Self {
        let raw = env::var(STORAGE_BACKEND_ENV).unwrap_or_default();
        Self::parse(&raw).unwrap_or_else(|| {
            if !raw.is_empty() {
                warn!(value = %raw, "unknown storage backend; using default");
            }
            Self::default()
        })
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            #[cfg(feature = "mongo-store")]
            "mongo" | "mongodb" => Some(Self::Mongo),
            #[cfg(feature = "couch-store")]
            "couch" | "couchdb" => Some(Self::Couch),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

impl Default for StorageBackend {
    #[allow(unreachable_code)]
    fn default() -> Self {
        #[cfg(feature = "mongo-store")]
        return Self::Mongo;
        #[cfg(feature = "couch-store")]
        return Self::Couch;
        Self::Memory
    }
}
