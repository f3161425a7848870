//! The execution strategy boundary.

use std::time::Duration;

use async_trait::async_trait;

use domino_core::{DeploymentStatus, SourceType};

use crate::error::AgentError;

/// How lifecycle commands are carried out for one runtime kind.
///
/// Implementations supply `deploy`, `start` and `stop`; `restart` is
/// provided in terms of those primitives.
#[async_trait]
pub trait ExecutionStrategy: Send + Sync {
    /// The runtime kind this strategy serves.
    fn execution_type(&self) -> SourceType;

    /// Pause between stop and start during a restart.
    fn start_delay(&self) -> Duration;

    /// Install `version` of the deployment and bring it up.
    async fn deploy(
        &self,
        deployment: &str,
        version: &str,
    ) -> Result<DeploymentStatus, AgentError>;

    /// Start the deployment.
    async fn start(&self, deployment: &str) -> Result<DeploymentStatus, AgentError>;

    /// Stop the deployment.
    async fn stop(&self, deployment: &str) -> Result<DeploymentStatus, AgentError>;

    /// Stop, wait out the start delay, then start again.
    ///
    /// The restart only proceeds to the start phase when the stop reported
    /// a stopped-family status; any other status is returned as the
    /// restart's own result.
    async fn restart(&self, deployment: &str) -> Result<DeploymentStatus, AgentError> {
        let stopped = self.stop(deployment).await?;
        if !stopped.is_stopped() {
            tracing::warn!(
                deployment,
                status = %stopped,
                "Stop phase of restart did not reach a stopped state"
            );
            return Ok(stopped);
        }

        tokio::time::sleep(self.start_delay()).await;
        self.start(deployment).await
    }
}
