/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Retries terminal outcomes the durable store missed.
pub mod outcome_reconciler;
/// Create, join and move operations.
pub mod session_service;
/// Durable store connection supervision and degraded mode.
pub mod storage_supervisor;
/// Viewer WebSocket handling.
pub mod websocket_service;
