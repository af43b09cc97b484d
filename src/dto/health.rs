use serde::Serialize;
use utoipa::ToSchema;

/// Payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `"ok"` when the session store answers, `"degraded"` otherwise.
    pub status: &'static str,
    /// Finished sessions whose outcome still waits for the durable store.
    pub pending_outcomes: usize,
}

impl HealthResponse {
    /// Session store reachable.
    pub fn ok(pending_outcomes: usize) -> Self {
        Self {
            status: "ok",
            pending_outcomes,
        }
    }

    /// Running without a usable session store.
    pub fn degraded(pending_outcomes: usize) -> Self {
        Self {
            status: "degraded",
            pending_outcomes,
        }
    }
}
