//! Fleet command service.
//!
//! The caller-facing API for issuing lifecycle commands: resolves the target
//! agent's live connection, dispatches the command envelope, and awaits the
//! terminal [`OperationResult`] through the operation registry. The caller
//! always receives a terminal status within the configured operation timeout.

use std::sync::Arc;

use domino_core::{LifecycleCommand, OperationResult};
use domino_proto::{Envelope, LifecyclePayload, MessageType};

use crate::error::{CoordinatorError, Result};
use crate::operations::OperationRegistry;
use crate::registry::AgentRegistry;

/// Issues lifecycle commands to tracked agents.
pub struct FleetService {
    registry: Arc<AgentRegistry>,
    operations: Arc<OperationRegistry>,
}

impl FleetService {
    /// Create the service over the two coordinator registries.
    #[must_use]
    pub fn new(registry: Arc<AgentRegistry>, operations: Arc<OperationRegistry>) -> Self {
        Self {
            registry,
            operations,
        }
    }

    /// Send a lifecycle command to the agent configured under `agent_key` and
    /// await its terminal result.
    ///
    /// Concurrent in-flight commands to the same agent are allowed; results
    /// are attributed by correlation ID, not connection identity.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAgent` if the key matches no configured agent,
    /// `AgentNotConnected` if the agent has no live tracked connection, or
    /// `ConnectionClosed` if the command could not be queued.
    pub async fn send_command(
        &self,
        agent_key: &str,
        command: LifecycleCommand,
        deployment: &str,
        version: Option<String>,
    ) -> Result<OperationResult> {
        let identity = self
            .registry
            .find_known(agent_key)
            .ok_or_else(|| CoordinatorError::UnknownAgent(agent_key.to_string()))?;

        let handle = self
            .registry
            .connection_for(&identity)
            .ok_or_else(|| CoordinatorError::AgentNotConnected(identity.agent_id()))?;

        let payload = LifecyclePayload {
            command,
            deployment: deployment.to_string(),
            version,
        };
        let envelope = Envelope::new(MessageType::Lifecycle, &payload)?;

        tracing::info!(
            agent_id = %identity.agent_id(),
            correlation_id = %envelope.message_id,
            command = %command,
            deployment,
            "Dispatching lifecycle command"
        );

        let rx = self
            .operations
            .register(&envelope.message_id, command, handle.id());

        if let Err(err) = handle.send_envelope(&envelope).await {
            self.operations.discard(&envelope.message_id);
            return Err(err);
        }

        rx.await.map_err(|_| {
            CoordinatorError::Internal("operation registry dropped the pending result".to_string())
        })
    }
}
