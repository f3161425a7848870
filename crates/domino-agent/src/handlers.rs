//! Agent-side message handlers.
//!
//! One handler per coordinator-originated message type, wired into a
//! dispatcher at startup. Handlers report their own failures back as
//! `FAILURE` envelopes or logs; none of them can take down the connection.

use std::sync::Arc;

use async_trait::async_trait;

use domino_core::SourceType;
use domino_proto::{
    ConfirmationPayload, Envelope, FailurePayload, LifecyclePayload, MessageDispatcher,
    MessageHandler, MessageType, ResultPayload,
};

use crate::context::{AgentStatus, CoordinatorLink, LinkState};
use crate::error::AgentError;
use crate::executor::StrategyRegistry;

/// Context shared by all handlers on the live connection.
pub struct AgentContext {
    /// Outbound link to the coordinator.
    pub link: CoordinatorLink,
    /// Lifecycle and keep-alive state.
    pub state: Arc<LinkState>,
    /// Execution strategies by runtime kind.
    pub executor: Arc<StrategyRegistry>,
    /// The runtime kind this agent was configured with.
    pub source_type: SourceType,
}

/// Build the dispatcher with every coordinator-originated type registered.
#[must_use]
pub fn build_dispatcher() -> MessageDispatcher<AgentContext> {
    MessageDispatcher::new()
        .with_handler(MessageType::Confirmation, Box::new(ConfirmationHandler))
        .with_handler(MessageType::Ping, Box::new(PingHandler))
        .with_handler(MessageType::Pong, Box::new(PongHandler))
        .with_handler(MessageType::Lifecycle, Box::new(LifecycleHandler))
}

/// Handles `CONFIRMATION`: the coordinator accepted our announcement.
struct ConfirmationHandler;

#[async_trait]
impl MessageHandler<AgentContext> for ConfirmationHandler {
    async fn process(&self, ctx: &AgentContext, envelope: Envelope) {
        match envelope.parse_payload::<ConfirmationPayload>() {
            Ok(payload) => {
                tracing::info!(message = %payload.message, "Tracked by coordinator");
                ctx.state.set_status(AgentStatus::Listening);
            }
            Err(err) => {
                tracing::warn!(error = %err, "Malformed confirmation payload");
            }
        }
    }
}

/// Handles `PING` from the coordinator by answering `PONG`.
struct PingHandler;

#[async_trait]
impl MessageHandler<AgentContext> for PingHandler {
    async fn process(&self, ctx: &AgentContext, envelope: Envelope) {
        let pong = envelope.reply_empty(MessageType::Pong);
        if let Err(err) = ctx.link.send_envelope(&pong).await {
            tracing::warn!(error = %err, "Failed to answer ping");
        }
    }
}

/// Handles `PONG`: mark our own outstanding ping as confirmed.
struct PongHandler;

#[async_trait]
impl MessageHandler<AgentContext> for PongHandler {
    async fn process(&self, ctx: &AgentContext, _envelope: Envelope) {
        tracing::debug!("Pong received");
        ctx.state.set_ping_confirmed(true);
    }
}

/// Handles `LIFECYCLE`: execute the command and answer with `RESULT` or
/// `FAILURE` on the same correlation ID.
struct LifecycleHandler;

impl LifecycleHandler {
    async fn execute(
        executor: &StrategyRegistry,
        source_type: SourceType,
        payload: &LifecyclePayload,
    ) -> Result<ResultPayload, AgentError> {
        let strategy = executor.select(source_type)?;

        let (status, deployed_version) = match payload.command {
            domino_core::LifecycleCommand::Deploy => {
                let version = payload
                    .version
                    .clone()
                    .ok_or(AgentError::MissingVersion)?;
                let status = strategy.deploy(&payload.deployment, &version).await?;
                (status, Some(version))
            }
            domino_core::LifecycleCommand::Start => {
                (strategy.start(&payload.deployment).await?, None)
            }
            domino_core::LifecycleCommand::Stop => {
                (strategy.stop(&payload.deployment).await?, None)
            }
            domino_core::LifecycleCommand::Restart => {
                (strategy.restart(&payload.deployment).await?, None)
            }
        };

        Ok(ResultPayload {
            status,
            deploy_operation: payload.command,
            deployed_version,
        })
    }
}

#[async_trait]
impl MessageHandler<AgentContext> for LifecycleHandler {
    async fn process(&self, ctx: &AgentContext, envelope: Envelope) {
        let payload = match envelope.parse_payload::<LifecyclePayload>() {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(
                    message_id = %envelope.message_id,
                    error = %err,
                    "Malformed lifecycle payload"
                );
                return;
            }
        };

        tracing::info!(
            message_id = %envelope.message_id,
            command = %payload.command,
            deployment = %payload.deployment,
            "Executing lifecycle command"
        );

        // Runtime actions (image pulls, healthcheck retries) can take tens
        // of seconds; they run in their own task so the read loop keeps
        // serving pongs and further commands meanwhile.
        let link = ctx.link.clone();
        let executor = Arc::clone(&ctx.executor);
        let source_type = ctx.source_type;
        tokio::spawn(async move {
            let reply = match Self::execute(&executor, source_type, &payload).await {
                Ok(result) => envelope.reply(MessageType::Result, &result),
                Err(err) => {
                    tracing::warn!(
                        message_id = %envelope.message_id,
                        command = %payload.command,
                        error = %err,
                        "Lifecycle command failed"
                    );
                    envelope.reply(
                        MessageType::Failure,
                        &FailurePayload {
                            message: err.to_string(),
                        },
                    )
                }
            };

            match reply {
                Ok(reply) => {
                    if let Err(err) = link.send_envelope(&reply).await {
                        tracing::warn!(
                            message_id = %envelope.message_id,
                            error = %err,
                            "Failed to send command reply"
                        );
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "Failed to build command reply");
                }
            }
        });
    }
}
