//! Strategy for deployments running directly on the host.
//!
//! Covers both raw processes and service-manager units; the difference
//! between the two lives entirely in the injected adapter.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use domino_core::{DeploymentStatus, SourceType};

use super::runtime::RuntimeAdapter;
use super::strategy::ExecutionStrategy;
use crate::error::AgentError;
use crate::healthcheck::HealthGate;

/// Executes lifecycle commands against a host-level runtime adapter.
pub struct HostStrategy {
    source_type: SourceType,
    adapter: Arc<dyn RuntimeAdapter>,
    health: HealthGate,
    start_delay: Duration,
}

impl HostStrategy {
    /// Strategy for `source_type` backed by the given adapter.
    #[must_use]
    pub fn new(
        source_type: SourceType,
        adapter: Arc<dyn RuntimeAdapter>,
        health: HealthGate,
        start_delay: Duration,
    ) -> Self {
        Self {
            source_type,
            adapter,
            health,
            start_delay,
        }
    }
}

#[async_trait]
impl ExecutionStrategy for HostStrategy {
    fn execution_type(&self) -> SourceType {
        self.source_type
    }

    fn start_delay(&self) -> Duration {
        self.start_delay
    }

    async fn deploy(
        &self,
        deployment: &str,
        version: &str,
    ) -> Result<DeploymentStatus, AgentError> {
        self.adapter.create(deployment, version).await?;
        self.adapter.start(deployment).await?;
        Ok(self.health.confirm(DeploymentStatus::Deployed).await)
    }

    async fn start(&self, deployment: &str) -> Result<DeploymentStatus, AgentError> {
        self.adapter.start(deployment).await?;
        Ok(self.health.confirm(DeploymentStatus::Deployed).await)
    }

    async fn stop(&self, deployment: &str) -> Result<DeploymentStatus, AgentError> {
        let was_running = self.adapter.stop(deployment).await?;
        Ok(if was_running {
            DeploymentStatus::Stopped
        } else {
            DeploymentStatus::UnknownStopped
        })
    }
}
