//! Coordinator connection establishment.
//!
//! Opens the WebSocket, then splits it into a writer task fed by an mpsc
//! channel (so handlers can send concurrently with ordered writes) and a
//! read loop that feeds inbound frames to the dispatcher. Either side
//! ending the socket is fatal for the agent; external supervision restarts
//! the process to reconnect.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use domino_proto::MessageDispatcher;

use crate::context::{CoordinatorLink, TaskContext};
use crate::error::AgentError;
use crate::executor::StrategyRegistry;
use crate::handlers::AgentContext;
use crate::pipeline::{Task, TaskStatus};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Outbound frame queue depth before handler sends apply backpressure.
const OUTBOUND_BUFFER: usize = 32;

/// Opens the coordinator socket and wires up the read/write loops.
pub struct ConnectTask {
    dispatcher: Arc<MessageDispatcher<AgentContext>>,
    executor: Arc<StrategyRegistry>,
}

impl ConnectTask {
    /// Task using the given dispatcher and strategy set for the connection.
    #[must_use]
    pub fn new(
        dispatcher: Arc<MessageDispatcher<AgentContext>>,
        executor: Arc<StrategyRegistry>,
    ) -> Self {
        Self {
            dispatcher,
            executor,
        }
    }
}

#[async_trait]
impl Task for ConnectTask {
    fn name(&self) -> &'static str {
        "connect"
    }

    async fn run(&self, ctx: &mut TaskContext) -> TaskStatus {
        let url = format!(
            "{}/agent/socket",
            ctx.config.coordinator_url.trim_end_matches('/')
        );

        let mut request = match url.clone().into_client_request() {
            Ok(request) => request,
            Err(err) => {
                tracing::error!(url = %url, error = %err, "Invalid coordinator URL");
                return TaskStatus::Failed;
            }
        };

        if let Some(headers) = &ctx.auth_headers {
            for (name, value) in headers {
                match HeaderValue::from_str(value) {
                    Ok(value) => {
                        request
                            .headers_mut()
                            .insert(HeaderName::from_static(name), value);
                    }
                    Err(err) => {
                        tracing::error!(header = name, error = %err, "Invalid header value");
                        return TaskStatus::Failed;
                    }
                }
            }
        }

        let socket = match connect_async(request).await {
            Ok((socket, _response)) => socket,
            Err(err) => {
                tracing::error!(url = %url, error = %err, "Connection to coordinator failed");
                return TaskStatus::Failed;
            }
        };
        tracing::info!(url = %url, "Connected to coordinator");

        let (sink, stream) = socket.split();
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        let link = CoordinatorLink::new(tx);

        let handler_ctx = AgentContext {
            link: link.clone(),
            state: Arc::clone(&ctx.link_state),
            executor: Arc::clone(&self.executor),
            source_type: ctx.config.source_type,
        };

        tokio::spawn(write_outbound(sink, rx));
        tokio::spawn(read_inbound(
            stream,
            Arc::clone(&self.dispatcher),
            handler_ctx,
            ctx.fatal.clone(),
        ));

        ctx.connection = Some(link);
        TaskStatus::Running
    }
}

/// Drain the outbound queue into the socket, preserving send order.
async fn write_outbound(mut sink: SplitSink<Socket, Message>, mut rx: mpsc::Receiver<String>) {
    while let Some(frame) = rx.recv().await {
        if let Err(err) = sink.send(Message::Text(frame)).await {
            tracing::warn!(error = %err, "Write to coordinator failed");
            break;
        }
    }
    let _ = sink.close().await;
}

/// Feed inbound frames to the dispatcher until the socket ends, then raise
/// a fatal error.
async fn read_inbound(
    mut stream: SplitStream<Socket>,
    dispatcher: Arc<MessageDispatcher<AgentContext>>,
    ctx: AgentContext,
    fatal: mpsc::Sender<AgentError>,
) {
    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(frame)) => dispatcher.dispatch(&ctx, &frame).await,
            Ok(Message::Close(_)) => {
                tracing::info!("Coordinator closed the connection");
                break;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, "Read from coordinator failed");
                break;
            }
        }
    }
    let _ = fatal.send(AgentError::LinkClosed).await;
}
