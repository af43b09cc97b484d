use axum::Router;

use crate::state::SharedState;

/// Swagger UI and OpenAPI JSON.
pub mod docs;
/// Health check route.
pub mod health;
/// Session lifecycle routes.
pub mod session;
/// Viewer WebSocket upgrade route.
pub mod websocket;

/// Compose all route trees and wire in the shared state.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(session::router())
        .merge(websocket::router())
        .merge(docs::router())
        .with_state(state)
}
