use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether the durable store is usable, logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let pending = state.pending_outcomes().len();
    if pending > 0 {
        warn!(pending, "terminal outcomes still waiting for the durable store");
    }

    let store = match state.require_session_store().await {
        Ok(store) => store,
        Err(_) => {
            warn!("session store unavailable (degraded mode)");
            return HealthResponse::degraded(pending);
        }
    };

    match store.health_check().await {
        Ok(()) => HealthResponse::ok(pending),
        Err(err) => {
            warn!(error = %err, "session store health check failed");
            HealthResponse::degraded(pending)
        }
    }
}
