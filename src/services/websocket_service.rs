use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::{ViewerInboundMessage, ViewerOutboundMessage},
    error::{ErrorKind, ServiceError},
    services::session_service,
    state::{
        SharedState,
        registry::{ConnectionId, ViewerConnection},
    },
};

/// Handle the full lifecycle of a viewer WebSocket attached to `session_id`.
///
/// The viewer receives the current snapshot, then every snapshot published for the session
/// until it disconnects. Moves sent over the socket go through the lifecycle service like
/// their HTTP counterpart.
pub async fn handle_socket(state: SharedState, session_id: Uuid, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (connection, mut outbound_rx) =
        ViewerConnection::channel(state.config().viewer_channel_capacity());
    let connection_id = connection.id;
    let direct_tx = connection.tx.clone();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let payload = match serde_json::to_string(&message) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(error = %err, "failed to serialize viewer message");
                    continue;
                }
            };
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    });

    if let Err(err) = session_service::attach_viewer(&state, session_id, connection).await {
        warn!(session_id = %session_id, error = %err, "rejecting viewer for unavailable session");
        let _ = direct_tx.try_send(error_message(&err));
        drop(direct_tx);
        let _ = writer_task.await;
        return;
    }

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                handle_text(&state, session_id, connection_id, &direct_tx, &text).await;
            }
            Ok(Message::Close(_)) => {
                info!(session_id = %session_id, connection_id = %connection_id, "viewer closed");
                break;
            }
            Ok(Message::Ping(_) | Message::Pong(_) | Message::Binary(_)) => {}
            Err(err) => {
                warn!(session_id = %session_id, connection_id = %connection_id, error = %err, "websocket error");
                break;
            }
        }
    }

    state.registry().unregister(connection_id, session_id);
    drop(direct_tx);
    let _ = writer_task.await;
}

/// Apply a move received over the socket; the service publishes the result to every viewer.
async fn handle_text(
    state: &SharedState,
    session_id: Uuid,
    connection_id: ConnectionId,
    direct_tx: &mpsc::Sender<ViewerOutboundMessage>,
    text: &str,
) {
    let inbound = match serde_json::from_str::<ViewerInboundMessage>(text) {
        Ok(inbound) => inbound,
        Err(err) => {
            warn!(connection_id = %connection_id, error = %err, "failed to parse viewer message");
            let _ = direct_tx.try_send(ViewerOutboundMessage::Error {
                kind: ErrorKind::InvalidInput,
                message: format!("unrecognized message: {err}"),
            });
            return;
        }
    };

    let ViewerInboundMessage::Move { turn, coordinates } = inbound;
    if let Err(err) = session_service::apply_move(state, &turn, &coordinates, session_id).await {
        info!(session_id = %session_id, connection_id = %connection_id, error = %err, "move rejected");
        let _ = direct_tx.try_send(error_message(&err));
    }
}

fn error_message(err: &ServiceError) -> ViewerOutboundMessage {
    ViewerOutboundMessage::Error {
        kind: err.kind(),
        message: err.to_string(),
    }
}
