use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::{dao::storage::StorageError, state::SharedState};

/// Periodically retry terminal outcomes that could not be written to the durable store.
pub async fn run(state: SharedState) {
    let mut ticker = interval(state.config().reconcile_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if state.pending_outcomes().is_empty() {
            continue;
        }
        if state.is_degraded().await {
            debug!(
                pending = state.pending_outcomes().len(),
                "storage degraded; postponing outcome reconciliation"
            );
            continue;
        }
        reconcile_pending(&state).await;
    }
}

/// Retry every queued outcome once, returning how many reached the durable store.
pub async fn reconcile_pending(state: &SharedState) -> usize {
    let Some(store) = state.session_store().await else {
        return 0;
    };

    let queued: Vec<_> = state
        .pending_outcomes()
        .iter()
        .map(|entry| entry.value().clone())
        .collect();

    let mut persisted = 0;
    for identity in queued {
        let id = identity.id;
        match store.update(identity.clone()).await {
            Ok(()) => {
                state
                    .pending_outcomes()
                    .remove_if(&id, |_, queued| *queued == identity);
                info!(session_id = %id, "terminal outcome persisted after retry");
                persisted += 1;
            }
            Err(StorageError::Missing(_)) => {
                warn!(session_id = %id, "durable record vanished; dropping queued outcome");
                state.pending_outcomes().remove(&id);
            }
            Err(err) => {
                warn!(session_id = %id, error = %err, "terminal outcome retry failed");
            }
        }
    }
    persisted
}
