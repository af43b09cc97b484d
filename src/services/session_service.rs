//! Session lifecycle: creation, joining and move application.
//!
//! Live state in the cache is authoritative while a session is active. The durable store holds
//! identity and is only written again on join and on the terminal move. Every read-modify-write
//! on an existing session runs under that session's lock, and so does the fan-out of the
//! resulting snapshot, keeping viewers in commit order.

use std::time::SystemTime;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        models::{SessionEntity, SessionStatus},
        session_store::SessionStore,
        storage::StorageError,
    },
    dto::session::SessionSnapshot,
    error::ServiceError,
    dto::ws::ViewerOutboundMessage,
    state::{SharedState, board::Cell, registry::ViewerConnection, session::LiveSession},
};

/// Open a new session for `requester`, or seat them in `existing` as the second player.
pub async fn create_or_join(
    state: &SharedState,
    requester: String,
    existing: Option<Uuid>,
) -> Result<SessionSnapshot, ServiceError> {
    match existing {
        None => create_session(state, requester).await,
        Some(id) => join_session(state, requester, id).await,
    }
}

async fn create_session(
    state: &SharedState,
    requester: String,
) -> Result<SessionSnapshot, ServiceError> {
    let store = state.require_session_store().await?;
    let mut identity = SessionEntity::created_by(requester, SystemTime::now());
    identity.id = store.insert(identity.clone()).await?;

    let live = LiveSession::from_identity(identity);
    state.cache().put(&live).await?;

    info!(session_id = %live.id(), player = %live.identity.player1, "session created");
    Ok(live.into())
}

async fn join_session(
    state: &SharedState,
    requester: String,
    id: Uuid,
) -> Result<SessionSnapshot, ServiceError> {
    let store = state.require_session_store().await?;
    let _guard = state.locks().acquire(id).await;

    let mut identity = store
        .find_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound(id))?;
    if identity.is_over {
        return Err(ServiceError::GameOver);
    }
    if identity.is_full() {
        return Err(ServiceError::GameFull);
    }
    let live = state
        .cache()
        .get(id)
        .await?
        .ok_or(ServiceError::Expired(id))?;

    identity.player2 = Some(requester.clone());
    identity.status = SessionStatus::Init;
    identity.turn = identity.player1.clone();
    identity.updated_by = requester;
    identity.updated_at = SystemTime::now();

    store
        .update(identity.clone())
        .await
        .map_err(|err| match err {
            StorageError::Missing(id) => ServiceError::NotFound(id),
            other => ServiceError::Unavailable(other),
        })?;

    let live = live.with_identity(identity);
    state.cache().put(&live).await?;

    info!(session_id = %id, player = %live.identity.updated_by, "player joined session");
    let snapshot = SessionSnapshot::from(live);
    state.registry().publish(id, &snapshot, &[]);
    Ok(snapshot)
}

/// Play `coordinates` on behalf of `turn_claim` in session `id`.
///
/// Checks run in a fixed order and the first failure wins; nothing is written before all of
/// them pass.
pub async fn apply_move(
    state: &SharedState,
    turn_claim: &str,
    coordinates: &[i64],
    id: Uuid,
) -> Result<SessionSnapshot, ServiceError> {
    let store = state.require_session_store().await?;
    let _guard = state.locks().acquire(id).await;

    if store.find_by_id(id).await?.is_none() {
        return Err(ServiceError::NotFound(id));
    }
    let live = state
        .cache()
        .get(id)
        .await?
        .ok_or(ServiceError::Expired(id))?;
    if turn_claim != live.identity.turn {
        return Err(ServiceError::NotYourTurn);
    }
    if live.identity.is_over {
        return Err(ServiceError::GameOver);
    }
    let cell = Cell::from_coordinates(coordinates)?;
    let symbol = live
        .acting_symbol(turn_claim)
        .ok_or(ServiceError::NotYourTurn)?;

    let (next, outcome) = live.record_move(turn_claim, symbol, cell, SystemTime::now())?;
    state.cache().put(&next).await?;
    if outcome.is_terminal() {
        // Dequeued by persist_outcome once the durable write lands.
        state.pending_outcomes().insert(id, next.identity.clone());
    }

    debug!(
        session_id = %id,
        player = %turn_claim,
        row = cell.row(),
        col = cell.col(),
        outcome = ?outcome,
        "move applied"
    );

    if outcome.is_terminal() {
        info!(
            session_id = %id,
            winner = next.identity.winner.as_deref().unwrap_or("-"),
            draw = next.identity.is_draw,
            "session finished"
        );
        persist_outcome(state, store.as_ref(), next.identity.clone()).await;
    }

    let snapshot = SessionSnapshot::from(next);
    state.registry().publish(id, &snapshot, &[]);
    Ok(snapshot)
}

/// Current snapshot of session `id`.
pub async fn get_snapshot(state: &SharedState, id: Uuid) -> Result<SessionSnapshot, ServiceError> {
    let store = state.require_session_store().await?;
    read_snapshot(state, store.as_ref(), id).await
}

/// Send the current snapshot of `id` to `connection`, then register it as a viewer.
///
/// Runs under the session lock so no publish can land between the two steps.
pub async fn attach_viewer(
    state: &SharedState,
    id: Uuid,
    connection: ViewerConnection,
) -> Result<(), ServiceError> {
    let store = state.require_session_store().await?;
    let _guard = state.locks().acquire(id).await;

    let snapshot = read_snapshot(state, store.as_ref(), id).await?;
    if connection
        .tx
        .try_send(ViewerOutboundMessage::Snapshot(snapshot))
        .is_err()
    {
        warn!(session_id = %id, connection_id = %connection.id, "viewer gone before first snapshot");
        return Ok(());
    }
    state.registry().register(connection, id);
    Ok(())
}

async fn read_snapshot(
    state: &SharedState,
    store: &dyn SessionStore,
    id: Uuid,
) -> Result<SessionSnapshot, ServiceError> {
    if store.find_by_id(id).await?.is_none() {
        return Err(ServiceError::NotFound(id));
    }
    let live = state
        .cache()
        .get(id)
        .await?
        .ok_or(ServiceError::Expired(id))?;
    Ok(live.into())
}

/// Write a terminal identity already queued in `pending_outcomes` to the durable store.
///
/// The cache holds the terminal state, so a failure leaves the entry for the outcome
/// reconciler instead of failing the move.
async fn persist_outcome(state: &SharedState, store: &dyn SessionStore, identity: SessionEntity) {
    let id = identity.id;
    match store.update(identity.clone()).await {
        Ok(()) => {
            state
                .pending_outcomes()
                .remove_if(&id, |_, queued| *queued == identity);
        }
        Err(err) => {
            warn!(
                session_id = %id,
                error = %err,
                "failed to persist terminal outcome; queued for retry"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        time::Duration,
    };

    use futures::future::BoxFuture;

    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            session_cache::MemoryCache,
            session_store::MemorySessionStore,
            storage::StorageResult,
        },
        services::outcome_reconciler::reconcile_pending,
        state::{AppState, board::Symbol},
    };

    /// Memory store whose updates can be switched to fail or to never complete.
    #[derive(Clone, Default)]
    struct FlakyStore {
        inner: MemorySessionStore,
        fail_updates: Arc<AtomicBool>,
        stall_updates: Arc<AtomicBool>,
    }

    impl FlakyStore {
        fn failing(&self, fail: bool) {
            self.fail_updates.store(fail, Ordering::SeqCst);
        }

        fn stalling(&self, stall: bool) {
            self.stall_updates.store(stall, Ordering::SeqCst);
        }
    }

    impl SessionStore for FlakyStore {
        fn insert(&self, session: SessionEntity) -> BoxFuture<'static, StorageResult<Uuid>> {
            self.inner.insert(session)
        }

        fn find_by_id(
            &self,
            id: Uuid,
        ) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
            self.inner.find_by_id(id)
        }

        fn update(&self, session: SessionEntity) -> BoxFuture<'static, StorageResult<()>> {
            if self.fail_updates.load(Ordering::SeqCst) {
                let err = StorageError::unavailable(
                    "update refused".into(),
                    std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"),
                );
                return Box::pin(async move { Err(err) });
            }
            if self.stall_updates.load(Ordering::SeqCst) {
                return Box::pin(futures::future::pending());
            }
            self.inner.update(session)
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.health_check()
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.try_reconnect()
        }
    }

    async fn state_with(store: Arc<dyn SessionStore>) -> SharedState {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryCache::new()));
        state.set_session_store(store).await;
        state
    }

    async fn memory_state() -> (SharedState, MemorySessionStore) {
        let store = MemorySessionStore::new();
        (state_with(Arc::new(store.clone())).await, store)
    }

    async fn started(state: &SharedState) -> Uuid {
        let created = create_or_join(state, "alice".into(), None).await.unwrap();
        create_or_join(state, "bob".into(), Some(created.id))
            .await
            .unwrap();
        created.id
    }

    async fn play(state: &SharedState, id: Uuid, moves: &[(&str, i64, i64)]) -> SessionSnapshot {
        let mut last = None;
        for (player, row, col) in moves {
            last = Some(apply_move(state, player, &[*row, *col], id).await.unwrap());
        }
        last.expect("at least one move")
    }

    #[tokio::test]
    async fn create_seats_the_requester_as_x() {
        let (state, store) = memory_state().await;
        let snapshot = create_or_join(&state, "alice".into(), None).await.unwrap();

        assert_ne!(snapshot.id, Uuid::nil());
        assert_eq!(snapshot.status, SessionStatus::Create);
        assert_eq!(snapshot.turn, "alice");
        assert_eq!(snapshot.player1_symbol, Symbol::X);
        assert_eq!(snapshot.player2_symbol, Symbol::O);
        assert_eq!(snapshot.created_by, "alice");
        assert_eq!(snapshot.updated_by, "alice");
        assert!(snapshot.player2.is_none());
        assert!(snapshot.last_move.is_none());

        let durable = store.find_by_id(snapshot.id).await.unwrap().unwrap();
        assert_eq!(durable.status, SessionStatus::Create);
        assert!(state.cache().exists(snapshot.id).await.unwrap());
    }

    #[tokio::test]
    async fn join_fills_second_seat_and_keeps_turn() {
        let (state, store) = memory_state().await;
        let created = create_or_join(&state, "alice".into(), None).await.unwrap();
        let joined = create_or_join(&state, "bob".into(), Some(created.id))
            .await
            .unwrap();

        assert_eq!(joined.id, created.id);
        assert_eq!(joined.player2.as_deref(), Some("bob"));
        assert_eq!(joined.status, SessionStatus::Init);
        assert_eq!(joined.turn, "alice");
        assert_eq!(joined.updated_by, "bob");
        assert_eq!(joined.board, created.board);

        let durable = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(durable.player2.as_deref(), Some("bob"));
        assert_eq!(durable.status, SessionStatus::Init);
    }

    #[tokio::test]
    async fn join_rejections_follow_documented_kinds() {
        let (state, _) = memory_state().await;

        let missing = Uuid::new_v4();
        assert!(matches!(
            create_or_join(&state, "bob".into(), Some(missing)).await,
            Err(ServiceError::NotFound(id)) if id == missing
        ));

        let id = started(&state).await;
        assert!(matches!(
            create_or_join(&state, "carol".into(), Some(id)).await,
            Err(ServiceError::GameFull)
        ));

        play(
            &state,
            id,
            &[("alice", 0, 0), ("bob", 1, 0), ("alice", 0, 1), ("bob", 1, 1), ("alice", 0, 2)],
        )
        .await;
        assert!(matches!(
            create_or_join(&state, "carol".into(), Some(id)).await,
            Err(ServiceError::GameOver)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_live_state_rejects_join_and_moves() {
        let (state, _) = memory_state().await;
        let created = create_or_join(&state, "alice".into(), None).await.unwrap();

        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(matches!(
            create_or_join(&state, "bob".into(), Some(created.id)).await,
            Err(ServiceError::Expired(_))
        ));
        assert!(matches!(
            apply_move(&state, "alice", &[0, 0], created.id).await,
            Err(ServiceError::Expired(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn each_move_restarts_the_ttl() {
        let (state, _) = memory_state().await;
        let id = started(&state).await;

        tokio::time::advance(Duration::from_secs(25)).await;
        apply_move(&state, "alice", &[0, 0], id).await.unwrap();
        tokio::time::advance(Duration::from_secs(25)).await;
        apply_move(&state, "bob", &[1, 1], id).await.unwrap();
        tokio::time::advance(Duration::from_secs(25)).await;
        assert!(get_snapshot(&state, id).await.is_ok());
    }

    #[tokio::test]
    async fn first_move_starts_play_and_flips_turn() {
        let (state, store) = memory_state().await;
        let id = started(&state).await;

        let snapshot = apply_move(&state, "alice", &[1, 1], id).await.unwrap();
        assert_eq!(snapshot.status, SessionStatus::InProgress);
        assert_eq!(snapshot.turn, "bob");
        assert_eq!(snapshot.updated_by, "alice");
        assert_eq!(snapshot.last_move, Some([1, 1]));
        assert_eq!(snapshot.board.get(Cell::new(1, 1).unwrap()), Some(Symbol::X));

        let durable = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(durable.status, SessionStatus::Init);
    }

    #[tokio::test]
    async fn move_validation_order() {
        let (state, _) = memory_state().await;

        let unknown = Uuid::new_v4();
        assert!(matches!(
            apply_move(&state, "alice", &[9], unknown).await,
            Err(ServiceError::NotFound(_))
        ));

        let id = started(&state).await;
        assert!(matches!(
            apply_move(&state, "bob", &[9, 9], id).await,
            Err(ServiceError::NotYourTurn)
        ));
        assert!(matches!(
            apply_move(&state, "alice", &[0, 3], id).await,
            Err(ServiceError::InvalidMove(_))
        ));
        assert!(matches!(
            apply_move(&state, "alice", &[0, 0, 0], id).await,
            Err(ServiceError::InvalidMove(_))
        ));

        apply_move(&state, "alice", &[0, 0], id).await.unwrap();
        assert!(matches!(
            apply_move(&state, "bob", &[0, 0], id).await,
            Err(ServiceError::InvalidMove(_))
        ));

        let snapshot = get_snapshot(&state, id).await.unwrap();
        assert_eq!(snapshot.turn, "bob");
        assert_eq!(snapshot.last_move, Some([0, 0]));
    }

    #[tokio::test]
    async fn creator_cannot_move_before_someone_joins() {
        let (state, _) = memory_state().await;
        let created = create_or_join(&state, "alice".into(), None).await.unwrap();

        assert!(matches!(
            apply_move(&state, "alice", &[0, 0], created.id).await,
            Err(ServiceError::NotYourTurn)
        ));
        let snapshot = get_snapshot(&state, created.id).await.unwrap();
        assert_eq!(snapshot.status, SessionStatus::Create);
        assert!(snapshot.last_move.is_none());
    }

    #[tokio::test]
    async fn replaying_a_move_is_rejected() {
        let (state, _) = memory_state().await;
        let id = started(&state).await;

        apply_move(&state, "alice", &[2, 2], id).await.unwrap();
        assert!(matches!(
            apply_move(&state, "alice", &[2, 2], id).await,
            Err(ServiceError::NotYourTurn)
        ));
    }

    #[tokio::test]
    async fn winning_move_is_persisted_durably() {
        let (state, store) = memory_state().await;
        let id = started(&state).await;

        let snapshot = play(
            &state,
            id,
            &[("alice", 0, 0), ("bob", 1, 0), ("alice", 0, 2), ("bob", 1, 1), ("alice", 0, 1)],
        )
        .await;
        assert!(snapshot.is_over);
        assert!(!snapshot.is_draw);
        assert_eq!(snapshot.winner.as_deref(), Some("alice"));
        assert_eq!(snapshot.status, SessionStatus::Finish);

        let durable = store.find_by_id(id).await.unwrap().unwrap();
        assert!(durable.is_over);
        assert_eq!(durable.winner.as_deref(), Some("alice"));
        assert_eq!(durable.status, SessionStatus::Finish);
        assert!(state.pending_outcomes().is_empty());

        assert!(matches!(
            apply_move(&state, "alice", &[2, 2], id).await,
            Err(ServiceError::GameOver)
        ));
    }

    #[tokio::test]
    async fn loser_claim_after_a_win_is_checked_before_game_over() {
        let (state, _) = memory_state().await;
        let id = started(&state).await;
        play(
            &state,
            id,
            &[("alice", 0, 0), ("bob", 1, 0), ("alice", 0, 2), ("bob", 1, 1), ("alice", 0, 1)],
        )
        .await;

        assert!(matches!(
            apply_move(&state, "bob", &[2, 2], id).await,
            Err(ServiceError::NotYourTurn)
        ));
        assert!(matches!(
            apply_move(&state, "alice", &[9, 9], id).await,
            Err(ServiceError::GameOver)
        ));
    }

    #[tokio::test]
    async fn full_board_without_line_is_a_durable_draw() {
        let (state, store) = memory_state().await;
        let id = started(&state).await;

        // X O X / O O X / X X O
        let snapshot = play(
            &state,
            id,
            &[
                ("alice", 0, 0),
                ("bob", 0, 1),
                ("alice", 0, 2),
                ("bob", 1, 0),
                ("alice", 1, 2),
                ("bob", 1, 1),
                ("alice", 2, 0),
                ("bob", 2, 2),
                ("alice", 2, 1),
            ],
        )
        .await;
        assert!(snapshot.is_over);
        assert!(snapshot.is_draw);
        assert!(snapshot.winner.is_none());

        let durable = store.find_by_id(id).await.unwrap().unwrap();
        assert!(durable.is_draw);
        assert_eq!(durable.status, SessionStatus::Finish);
    }

    #[tokio::test]
    async fn failed_terminal_write_is_queued_not_returned() {
        let store = FlakyStore::default();
        let state = state_with(Arc::new(store.clone())).await;
        let id = started(&state).await;
        store.failing(true);

        let snapshot = play(
            &state,
            id,
            &[("alice", 0, 0), ("bob", 1, 0), ("alice", 1, 1), ("bob", 2, 0), ("alice", 2, 2)],
        )
        .await;
        assert!(snapshot.is_over);

        let pending = state.pending_outcomes().get(&id).map(|e| e.value().clone());
        assert_eq!(pending.map(|p| p.status), Some(SessionStatus::Finish));
        let durable = store.find_by_id(id).await.unwrap().unwrap();
        assert!(!durable.is_over);
    }

    #[tokio::test]
    async fn concurrent_moves_on_one_session_do_not_both_land() {
        let (state, _) = memory_state().await;
        let id = started(&state).await;

        let first = {
            let state = state.clone();
            tokio::spawn(async move { apply_move(&state, "alice", &[0, 0], id).await })
        };
        let second = {
            let state = state.clone();
            tokio::spawn(async move { apply_move(&state, "alice", &[2, 2], id).await })
        };
        let results = [first.await.unwrap(), second.await.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(ServiceError::NotYourTurn)))
        );

        let snapshot = get_snapshot(&state, id).await.unwrap();
        let filled = [(0, 0), (2, 2)]
            .into_iter()
            .filter(|(r, c)| snapshot.board.get(Cell::new(*r, *c).unwrap()).is_some())
            .count();
        assert_eq!(filled, 1);
        assert!(state.locks().is_empty());
    }

    #[tokio::test]
    async fn degraded_mode_blocks_lifecycle_operations() {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryCache::new()));
        assert!(matches!(
            create_or_join(&state, "alice".into(), None).await,
            Err(ServiceError::Degraded)
        ));
        assert!(matches!(
            apply_move(&state, "alice", &[0, 0], Uuid::new_v4()).await,
            Err(ServiceError::Degraded)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_terminal_move_keeps_its_outcome_queued() {
        let store = FlakyStore::default();
        let state = state_with(Arc::new(store.clone())).await;
        let id = started(&state).await;
        play(
            &state,
            id,
            &[("alice", 0, 0), ("bob", 1, 0), ("alice", 0, 1), ("bob", 1, 1)],
        )
        .await;

        store.stalling(true);
        let winning = apply_move(&state, "alice", &[0, 2], id);
        assert!(
            tokio::time::timeout(Duration::from_millis(50), winning)
                .await
                .is_err()
        );

        let live = state.cache().get(id).await.unwrap().unwrap();
        assert!(live.identity.is_over);
        let queued = state.pending_outcomes().get(&id).map(|e| e.value().clone());
        assert_eq!(queued, Some(live.identity));
        assert!(state.locks().is_empty());

        store.stalling(false);
        assert_eq!(reconcile_pending(&state).await, 1);
        let durable = store.find_by_id(id).await.unwrap().unwrap();
        assert!(durable.is_over);
        assert_eq!(durable.winner.as_deref(), Some("alice"));
    }

    fn next_snapshot(rx: &mut mpsc::Receiver<ViewerOutboundMessage>) -> SessionSnapshot {
        loop {
            match rx.try_recv().expect("a queued message") {
                ViewerOutboundMessage::Snapshot(snapshot) => return snapshot,
                _ => continue,
            }
        }
    }

    fn filled_cells(snapshot: &SessionSnapshot) -> usize {
        (0..3)
            .flat_map(|row| (0..3).map(move |col| (row, col)))
            .filter(|(row, col)| snapshot.board.get(Cell::new(*row, *col).unwrap()).is_some())
            .count()
    }

    #[tokio::test]
    async fn attached_viewer_sees_current_state_then_each_change() {
        let (state, _) = memory_state().await;
        let created = create_or_join(&state, "alice".into(), None).await.unwrap();

        let (viewer, mut rx) = ViewerConnection::channel(8);
        attach_viewer(&state, created.id, viewer).await.unwrap();
        assert_eq!(state.registry().viewer_count(created.id), 1);

        let initial = next_snapshot(&mut rx);
        assert!(initial.player2.is_none());

        create_or_join(&state, "bob".into(), Some(created.id))
            .await
            .unwrap();
        let joined = next_snapshot(&mut rx);
        assert_eq!(joined.player2.as_deref(), Some("bob"));

        apply_move(&state, "alice", &[1, 1], created.id).await.unwrap();
        let moved = next_snapshot(&mut rx);
        assert_eq!(moved.last_move, Some([1, 1]));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn attaching_to_unknown_session_registers_nothing() {
        let (state, _) = memory_state().await;
        let missing = Uuid::new_v4();
        let (viewer, mut rx) = ViewerConnection::channel(8);

        assert!(matches!(
            attach_viewer(&state, missing, viewer).await,
            Err(ServiceError::NotFound(_))
        ));
        assert_eq!(state.registry().viewer_count(missing), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn viewers_receive_snapshots_in_commit_order() {
        let (state, _) = memory_state().await;
        let id = started(&state).await;
        let (viewer, mut rx) = ViewerConnection::channel(32);
        attach_viewer(&state, id, viewer).await.unwrap();
        next_snapshot(&mut rx);

        let player = |name: &'static str, cells: [[i64; 2]; 3]| {
            let state = state.clone();
            tokio::spawn(async move {
                for cell in cells {
                    loop {
                        match apply_move(&state, name, &cell, id).await {
                            Ok(_) => break,
                            Err(ServiceError::NotYourTurn) => tokio::task::yield_now().await,
                            Err(err) => panic!("unexpected rejection: {err}"),
                        }
                    }
                }
            })
        };
        // X: (0,0) (2,2) (1,0), O: (0,1) (1,1) (2,1) wins on the last move.
        let alice = player("alice", [[0, 0], [2, 2], [1, 0]]);
        let bob = player("bob", [[0, 1], [1, 1], [2, 1]]);
        alice.await.unwrap();
        bob.await.unwrap();

        let received: Vec<usize> = (0..6).map(|_| filled_cells(&next_snapshot(&mut rx))).collect();
        assert_eq!(received, vec![1, 2, 3, 4, 5, 6]);
        assert!(rx.try_recv().is_err());
    }
}
