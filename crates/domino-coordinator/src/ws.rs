//! Agent WebSocket endpoint.
//!
//! Agents connect here with `X-Api-Key` and `X-Agent-ID` headers. The key is
//! verified by hashed comparison before the upgrade; a mismatch terminates
//! the handshake with 401 and no envelope is exchanged. After the upgrade the
//! socket is split into a writer task draining the connection's outbound
//! channel and a read loop feeding the message dispatcher. Closing the socket
//! deterministically releases the connection's registry binding and fails its
//! pending operations.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::connection::{ConnectionHandle, ConnectionId, Outbound};
use crate::handlers::ConnectionContext;
use crate::state::CoordinatorState;

/// Size of the per-connection outbound queue.
const OUTBOUND_QUEUE: usize = 32;

/// WebSocket connection handler.
///
/// Verifies the handshake headers and upgrades, then runs the connection
/// until the socket closes.
pub async fn agent_socket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<CoordinatorState>>,
    headers: HeaderMap,
) -> Response {
    let presented = headers
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !state.config.api_key_matches(presented) {
        tracing::warn!("Agent handshake rejected: bad API key");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let announced_id = headers
        .get("x-agent-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("<unset>")
        .to_string();

    tracing::info!(agent_id = %announced_id, "Agent connection initiated");

    ws.on_upgrade(move |socket| handle_agent_socket(socket, state, announced_id))
}

/// Run one agent connection after the upgrade.
async fn handle_agent_socket(socket: WebSocket, state: Arc<CoordinatorState>, announced_id: String) {
    let connection = ConnectionId::generate();
    let (socket_write, socket_read) = socket.split();
    let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE);

    let handle = ConnectionHandle::new(connection, tx);
    let writer = tokio::spawn(write_outbound(rx, socket_write, connection));

    let ctx = ConnectionContext::new(handle);
    read_inbound(socket_read, &state, &ctx, connection).await;

    // Socket is gone: neither the binding nor any pending operation for this
    // connection may outlive it.
    state.registry.mark_agent_disconnected(connection);
    state.operations.fail_connection(connection);
    drop(ctx);
    let _ = writer.await;

    tracing::info!(connection = %connection, agent_id = %announced_id, "Agent connection ended");
}

/// Drain the outbound channel onto the socket, flushing in order.
async fn write_outbound(
    mut rx: mpsc::Receiver<Outbound>,
    mut socket_write: SplitSink<WebSocket, Message>,
    connection: ConnectionId,
) {
    while let Some(outbound) = rx.recv().await {
        match outbound {
            Outbound::Frame(frame) => {
                if let Err(err) = socket_write.send(Message::Text(frame)).await {
                    tracing::debug!(connection = %connection, error = %err, "Write failed");
                    break;
                }
            }
            Outbound::Close => {
                let _ = socket_write.send(Message::Close(None)).await;
                break;
            }
        }
    }
}

/// Feed inbound text frames to the dispatcher until the socket closes.
async fn read_inbound(
    mut socket_read: SplitStream<WebSocket>,
    state: &CoordinatorState,
    ctx: &ConnectionContext,
    connection: ConnectionId,
) {
    while let Some(message) = socket_read.next().await {
        match message {
            Ok(Message::Text(frame)) => {
                if let Some(identity) = state.registry.identify_agent(connection) {
                    tracing::debug!(
                        connection = %connection,
                        agent_id = %identity.agent_id(),
                        "Inbound frame"
                    );
                }
                state.dispatcher.dispatch(ctx, &frame).await;
                if ctx.is_terminated() {
                    tracing::debug!(
                        connection = %connection,
                        "Connection terminated by handler, dropping queued frames"
                    );
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                tracing::debug!(connection = %connection, "Agent closed connection");
                break;
            }
            // Transport-level ping/pong is handled by the WebSocket layer.
            Ok(Message::Ping(_) | Message::Pong(_) | Message::Binary(_)) => {}
            Err(err) => {
                tracing::debug!(connection = %connection, error = %err, "Read failed");
                break;
            }
        }
    }
}
