/// Database model definitions.
pub mod models;
/// Ephemeral live-state storage with expiration.
pub mod session_cache;
/// Durable session storage and retrieval operations.
pub mod session_store;
/// Storage abstraction layer for database operations.
pub mod storage;
