//! Coordinator-side message handlers.
//!
//! One handler per inbound message type, registered into the shared
//! [`MessageDispatcher`] at startup. Handlers catch and log their own
//! failures; a malformed payload never takes down the connection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use domino_proto::{
    AnnouncementPayload, ConfirmationPayload, Envelope, FailurePayload, MessageDispatcher,
    MessageHandler, MessageType, ResultPayload,
};

use crate::connection::ConnectionHandle;
use crate::operations::OperationRegistry;
use crate::registry::{AgentRegistry, TrackOutcome};

/// Per-message dispatch context: the connection the message arrived on.
pub struct ConnectionContext {
    /// Outbound handle for the originating connection.
    pub connection: ConnectionHandle,
    terminated: AtomicBool,
}

impl ConnectionContext {
    /// Context for a freshly accepted connection.
    #[must_use]
    pub fn new(connection: ConnectionHandle) -> Self {
        Self {
            connection,
            terminated: AtomicBool::new(false),
        }
    }

    /// Mark the connection as terminated.
    ///
    /// The read loop checks this after every dispatch: once set, no further
    /// frame from this connection may reach a handler.
    pub fn terminate(&self) {
        self.terminated.store(true, Ordering::SeqCst);
    }

    /// Whether a handler terminated the connection.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }
}

/// Build the coordinator's dispatcher with all handlers registered.
#[must_use]
pub fn build_dispatcher(
    registry: Arc<AgentRegistry>,
    operations: Arc<OperationRegistry>,
) -> MessageDispatcher<ConnectionContext> {
    MessageDispatcher::new()
        .with_handler(
            MessageType::Announcement,
            Box::new(AnnouncementHandler { registry }),
        )
        .with_handler(MessageType::Ping, Box::new(PingHandler))
        .with_handler(MessageType::Pong, Box::new(PongHandler))
        .with_handler(
            MessageType::Result,
            Box::new(ResultHandler {
                operations: Arc::clone(&operations),
            }),
        )
        .with_handler(MessageType::Failure, Box::new(FailureHandler { operations }))
}

/// Handles `ANNOUNCEMENT`: authorize the triple and confirm or terminate.
struct AnnouncementHandler {
    registry: Arc<AgentRegistry>,
}

#[async_trait]
impl MessageHandler<ConnectionContext> for AnnouncementHandler {
    async fn process(&self, ctx: &ConnectionContext, envelope: Envelope) {
        let announcement: AnnouncementPayload = match envelope.parse_payload() {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "Dropping malformed announcement");
                return;
            }
        };

        match self.registry.track_agent(&announcement, ctx.connection.clone()) {
            TrackOutcome::Tracked(identity) => {
                let confirmation = ConfirmationPayload {
                    message: format!("agent tracked as {}", identity.agent_id()),
                };
                let reply = match envelope.reply(MessageType::Confirmation, &confirmation) {
                    Ok(reply) => reply,
                    Err(err) => {
                        tracing::error!(error = %err, "Cannot encode confirmation");
                        return;
                    }
                };
                if let Err(err) = ctx.connection.send_envelope(&reply).await {
                    tracing::warn!(error = %err, "Cannot send confirmation");
                }
            }
            TrackOutcome::Rejected => {
                // The connection must die before anything else is dispatched;
                // the flag stops the read loop from touching queued frames.
                ctx.terminate();
                ctx.connection.close().await;
            }
        }
    }
}

/// Handles `PING`: answer with `PONG` on the same connection.
struct PingHandler;

#[async_trait]
impl MessageHandler<ConnectionContext> for PingHandler {
    async fn process(&self, ctx: &ConnectionContext, envelope: Envelope) {
        let pong = envelope.reply_empty(MessageType::Pong);
        if let Err(err) = ctx.connection.send_envelope(&pong).await {
            tracing::debug!(error = %err, "Cannot answer ping");
        }
    }
}

/// Handles `PONG`: the keep-alive exchange is symmetric, so agents may pong
/// the coordinator even though it does not currently initiate pings.
struct PongHandler;

#[async_trait]
impl MessageHandler<ConnectionContext> for PongHandler {
    async fn process(&self, ctx: &ConnectionContext, envelope: Envelope) {
        tracing::debug!(
            connection = %ctx.connection.id(),
            message_id = %envelope.message_id,
            "Pong received"
        );
    }
}

/// Handles `RESULT`: resolve the matching pending operation.
struct ResultHandler {
    operations: Arc<OperationRegistry>,
}

#[async_trait]
impl MessageHandler<ConnectionContext> for ResultHandler {
    async fn process(&self, _ctx: &ConnectionContext, envelope: Envelope) {
        let payload: ResultPayload = match envelope.parse_payload() {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "Dropping malformed result");
                return;
            }
        };
        self.operations.resolve_result(&envelope.message_id, payload);
    }
}

/// Handles `FAILURE`: resolve the matching pending operation as failed.
struct FailureHandler {
    operations: Arc<OperationRegistry>,
}

#[async_trait]
impl MessageHandler<ConnectionContext> for FailureHandler {
    async fn process(&self, _ctx: &ConnectionContext, envelope: Envelope) {
        let payload: FailurePayload = match envelope.parse_payload() {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "Dropping malformed failure");
                return;
            }
        };
        self.operations
            .resolve_failure(&envelope.message_id, &payload.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{ConnectionId, Outbound};
    use domino_core::{AgentIdentity, DeploymentStatus, LifecycleCommand, SourceType};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn setup() -> (
        MessageDispatcher<ConnectionContext>,
        Arc<AgentRegistry>,
        Arc<OperationRegistry>,
        ConnectionContext,
        mpsc::Receiver<Outbound>,
    ) {
        let registry = Arc::new(AgentRegistry::new(vec![AgentIdentity::new(
            "k1",
            "h1",
            SourceType::Docker,
        )]));
        let operations = Arc::new(OperationRegistry::new(Duration::from_secs(5)));
        let dispatcher = build_dispatcher(Arc::clone(&registry), Arc::clone(&operations));

        let (tx, rx) = mpsc::channel(8);
        let ctx = ConnectionContext::new(ConnectionHandle::new(ConnectionId::generate(), tx));
        (dispatcher, registry, operations, ctx, rx)
    }

    async fn next_frame(rx: &mut mpsc::Receiver<Outbound>) -> Envelope {
        match rx.recv().await {
            Some(Outbound::Frame(frame)) => Envelope::from_frame(&frame).unwrap(),
            other => panic!("expected frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn known_announcement_confirms_with_agent_uri() {
        let (dispatcher, registry, _, ctx, mut rx) = setup();

        let frame = r#"{"messageID":"a-1","messageType":"ANNOUNCEMENT",
            "payload":{"agentKey":"k1","hostID":"h1","sourceType":"docker"}}"#;
        dispatcher.dispatch(&ctx, frame).await;

        let reply = next_frame(&mut rx).await;
        assert_eq!(reply.message_type, MessageType::Confirmation);
        assert_eq!(reply.message_id, "a-1");
        let confirmation: ConfirmationPayload = reply.parse_payload().unwrap();
        assert!(confirmation.message.contains("domino-agent://h1/docker/k1"));
        assert_eq!(registry.connected_count(), 1);
        assert!(!ctx.is_terminated());
    }

    #[tokio::test]
    async fn rejected_announcement_closes_connection() {
        let (dispatcher, registry, _, ctx, mut rx) = setup();

        let frame = r#"{"messageID":"a-1","messageType":"ANNOUNCEMENT",
            "payload":{"agentKey":"intruder","hostID":"h1","sourceType":"docker"}}"#;
        dispatcher.dispatch(&ctx, frame).await;

        assert!(matches!(rx.recv().await, Some(Outbound::Close)));
        assert_eq!(registry.connected_count(), 0);
        assert!(ctx.is_terminated());
    }

    #[tokio::test]
    async fn ping_is_answered_with_pong() {
        let (dispatcher, _, _, ctx, mut rx) = setup();

        dispatcher
            .dispatch(&ctx, r#"{"messageID":"p-1","messageType":"PING"}"#)
            .await;

        let reply = next_frame(&mut rx).await;
        assert_eq!(reply.message_type, MessageType::Pong);
        assert_eq!(reply.message_id, "p-1");
    }

    #[tokio::test]
    async fn result_resolves_pending_operation() {
        let (dispatcher, _, operations, ctx, _rx) = setup();
        let pending = operations.register("op-1", LifecycleCommand::Start, ctx.connection.id());

        let frame = r#"{"messageID":"op-1","messageType":"RESULT",
            "payload":{"status":"HEALTH_CHECK_OK","deployOperation":"START"}}"#;
        dispatcher.dispatch(&ctx, frame).await;

        let result = pending.await.unwrap();
        assert_eq!(result.status, DeploymentStatus::HealthCheckOk);
    }

    #[tokio::test]
    async fn failure_resolves_pending_operation() {
        let (dispatcher, _, operations, ctx, _rx) = setup();
        let pending = operations.register("op-1", LifecycleCommand::Deploy, ctx.connection.id());

        let frame = r#"{"messageID":"op-1","messageType":"FAILURE",
            "payload":{"message":"no such deployment"}}"#;
        dispatcher.dispatch(&ctx, frame).await;

        let result = pending.await.unwrap();
        assert_eq!(result.status, DeploymentStatus::Failure);
        assert_eq!(result.message.as_deref(), Some("no such deployment"));
    }

    #[tokio::test]
    async fn malformed_payload_is_swallowed() {
        let (dispatcher, registry, operations, ctx, mut rx) = setup();

        let frame = r#"{"messageID":"a-1","messageType":"ANNOUNCEMENT","payload":{"bogus":1}}"#;
        dispatcher.dispatch(&ctx, frame).await;

        assert_eq!(registry.connected_count(), 0);
        assert_eq!(operations.pending_count(), 0);
        assert!(rx.try_recv().is_err());
    }
}
