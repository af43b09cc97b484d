//! Library crate for tictactoe-back, exposing modules for binaries and integration tests.

/// Runtime configuration loading.
pub mod config;
/// Durable store and live-state cache adapters.
pub mod dao;
/// Request, response and WebSocket payloads.
pub mod dto;
/// Error types and their HTTP mapping.
pub mod error;
/// HTTP and WebSocket routing.
pub mod routes;
/// Session lifecycle and background tasks.
pub mod services;
/// Shared application state, board rules and viewer registry.
pub mod state;
