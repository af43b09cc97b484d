use std::fmt;

use dashmap::DashMap;
use indexmap::IndexMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::dto::{session::SessionSnapshot, ws::ViewerOutboundMessage};

/// Identifier of a single viewer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Allocate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Handle used to push messages to a connected viewer.
#[derive(Clone)]
pub struct ViewerConnection {
    /// Identifier used to unregister or exclude this viewer.
    pub id: ConnectionId,
    /// Bounded queue drained by the socket writer task.
    pub tx: mpsc::Sender<ViewerOutboundMessage>,
}

impl ViewerConnection {
    /// Build a connection with a bounded outbound queue, returning the receiving half.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ViewerOutboundMessage>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                id: ConnectionId::new(),
                tx,
            },
            rx,
        )
    }
}

enum Delivery {
    Queued,
    Dropped,
    Closed,
}

fn deliver(connection: &ViewerConnection, message: ViewerOutboundMessage) -> Delivery {
    match connection.tx.try_send(message) {
        Ok(()) => Delivery::Queued,
        Err(TrySendError::Full(_)) => Delivery::Dropped,
        Err(TrySendError::Closed(_)) => Delivery::Closed,
    }
}

/// Viewer connections grouped by session, used to fan out state changes.
///
/// Sends never block: a viewer with a full queue misses the message, and a viewer whose
/// queue is closed is unregistered.
#[derive(Default)]
pub struct BroadcastRegistry {
    sessions: DashMap<Uuid, IndexMap<ConnectionId, ViewerConnection>>,
}

impl BroadcastRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `connection` to `session_id` and tell the other viewers someone joined.
    pub fn register(&self, connection: ViewerConnection, session_id: Uuid) {
        let connection_id = connection.id;
        let (others, viewers) = {
            let mut entry = self.sessions.entry(session_id).or_default();
            entry.insert(connection_id, connection);
            let others: Vec<ViewerConnection> = entry
                .values()
                .filter(|other| other.id != connection_id)
                .cloned()
                .collect();
            (others, entry.len())
        };

        info!(session_id = %session_id, connection_id = %connection_id, viewers, "viewer registered");

        let message = ViewerOutboundMessage::ParticipantJoined { viewers };
        self.fan_out(session_id, others, message);
    }

    /// Detach `connection_id` from `session_id`, dropping the session entry once empty.
    pub fn unregister(&self, connection_id: ConnectionId, session_id: Uuid) {
        let removed = self
            .sessions
            .get_mut(&session_id)
            .and_then(|mut entry| entry.shift_remove(&connection_id))
            .is_some();
        self.sessions
            .remove_if(&session_id, |_, connections| connections.is_empty());

        if removed {
            info!(session_id = %session_id, connection_id = %connection_id, "viewer unregistered");
        }
    }

    /// Push `snapshot` to every viewer of `session_id` not listed in `excluding`.
    ///
    /// Returns how many viewers had the message queued.
    pub fn publish(
        &self,
        session_id: Uuid,
        snapshot: &SessionSnapshot,
        excluding: &[ConnectionId],
    ) -> usize {
        let targets: Vec<ViewerConnection> = match self.sessions.get(&session_id) {
            Some(entry) => entry
                .values()
                .filter(|connection| !excluding.contains(&connection.id))
                .cloned()
                .collect(),
            None => return 0,
        };

        self.fan_out(
            session_id,
            targets,
            ViewerOutboundMessage::Snapshot(snapshot.clone()),
        )
    }

    /// Number of viewers attached to `session_id`.
    pub fn viewer_count(&self, session_id: Uuid) -> usize {
        self.sessions
            .get(&session_id)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }

    /// Number of sessions with at least one viewer.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn fan_out(
        &self,
        session_id: Uuid,
        targets: Vec<ViewerConnection>,
        message: ViewerOutboundMessage,
    ) -> usize {
        let mut queued = 0;
        for connection in targets {
            match deliver(&connection, message.clone()) {
                Delivery::Queued => queued += 1,
                Delivery::Dropped => {
                    warn!(
                        session_id = %session_id,
                        connection_id = %connection.id,
                        "viewer queue full, dropping message"
                    );
                }
                Delivery::Closed => {
                    debug!(
                        session_id = %session_id,
                        connection_id = %connection.id,
                        "viewer channel closed, unregistering"
                    );
                    self.unregister(connection.id, session_id);
                }
            }
        }
        queued
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::{dao::models::SessionEntity, state::session::LiveSession};

    fn snapshot(id: Uuid) -> SessionSnapshot {
        let mut identity = SessionEntity::created_by("alice".into(), SystemTime::now());
        identity.id = id;
        LiveSession::from_identity(identity).into()
    }

    #[test]
    fn second_viewer_triggers_join_notice_for_the_others_only() {
        let registry = BroadcastRegistry::new();
        let session = Uuid::new_v4();
        let (first, mut first_rx) = ViewerConnection::channel(4);
        let (second, mut second_rx) = ViewerConnection::channel(4);

        registry.register(first, session);
        assert!(first_rx.try_recv().is_err());

        registry.register(second, session);
        assert_eq!(
            first_rx.try_recv().unwrap(),
            ViewerOutboundMessage::ParticipantJoined { viewers: 2 }
        );
        assert!(second_rx.try_recv().is_err());
    }

    #[test]
    fn publish_skips_excluded_connections() {
        let registry = BroadcastRegistry::new();
        let session = Uuid::new_v4();
        let (first, mut first_rx) = ViewerConnection::channel(4);
        let (second, mut second_rx) = ViewerConnection::channel(4);
        let skipped = second.id;
        registry.register(first, session);
        registry.register(second, session);
        let _ = first_rx.try_recv();

        let snap = snapshot(session);
        assert_eq!(registry.publish(session, &snap, &[skipped]), 1);

        assert_eq!(
            first_rx.try_recv().unwrap(),
            ViewerOutboundMessage::Snapshot(snap)
        );
        assert!(second_rx.try_recv().is_err());
    }

    #[test]
    fn publish_is_scoped_to_the_session() {
        let registry = BroadcastRegistry::new();
        let (viewer, mut rx) = ViewerConnection::channel(4);
        registry.register(viewer, Uuid::new_v4());

        let other = Uuid::new_v4();
        assert_eq!(registry.publish(other, &snapshot(other), &[]), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_viewer_is_dropped_without_blocking_the_rest() {
        let registry = BroadcastRegistry::new();
        let session = Uuid::new_v4();
        let (gone, gone_rx) = ViewerConnection::channel(4);
        let (alive, mut alive_rx) = ViewerConnection::channel(4);
        registry.register(gone, session);
        registry.register(alive, session);
        drop(gone_rx);

        assert_eq!(registry.publish(session, &snapshot(session), &[]), 1);
        assert!(matches!(
            alive_rx.try_recv().unwrap(),
            ViewerOutboundMessage::Snapshot(_)
        ));
        assert_eq!(registry.viewer_count(session), 1);
    }

    #[test]
    fn full_viewer_misses_the_message_but_stays_registered() {
        let registry = BroadcastRegistry::new();
        let session = Uuid::new_v4();
        let (slow, mut slow_rx) = ViewerConnection::channel(1);
        let (fast, mut fast_rx) = ViewerConnection::channel(4);
        registry.register(slow, session);
        registry.register(fast, session);

        // The join notice already fills the slow viewer's single slot.
        assert_eq!(registry.publish(session, &snapshot(session), &[]), 1);
        assert_eq!(registry.viewer_count(session), 2);
        assert!(matches!(
            slow_rx.try_recv().unwrap(),
            ViewerOutboundMessage::ParticipantJoined { .. }
        ));
        assert!(slow_rx.try_recv().is_err());
        assert!(matches!(
            fast_rx.try_recv().unwrap(),
            ViewerOutboundMessage::Snapshot(_)
        ));
    }

    #[test]
    fn last_unregister_drops_the_session_entry() {
        let registry = BroadcastRegistry::new();
        let session = Uuid::new_v4();
        let (viewer, _rx) = ViewerConnection::channel(4);
        let id = viewer.id;
        registry.register(viewer, session);
        assert_eq!(registry.session_count(), 1);

        registry.unregister(id, session);
        assert_eq!(registry.session_count(), 0);
        registry.unregister(id, session);
    }
}
