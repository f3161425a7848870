//! Strategy for container-engine deployments.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use domino_core::{DeploymentStatus, SourceType};

use super::runtime::RuntimeAdapter;
use super::strategy::ExecutionStrategy;
use crate::error::AgentError;
use crate::healthcheck::HealthGate;

/// Executes lifecycle commands against a container engine.
///
/// Deploy tears down the previous container before creating the new one,
/// so a failed stop of the old version never blocks rolling forward.
pub struct ContainerStrategy {
    engine: Arc<dyn RuntimeAdapter>,
    health: HealthGate,
    start_delay: Duration,
}

impl ContainerStrategy {
    /// Strategy backed by the given container engine adapter.
    #[must_use]
    pub fn new(
        engine: Arc<dyn RuntimeAdapter>,
        health: HealthGate,
        start_delay: Duration,
    ) -> Self {
        Self {
            engine,
            health,
            start_delay,
        }
    }
}

#[async_trait]
impl ExecutionStrategy for ContainerStrategy {
    fn execution_type(&self) -> SourceType {
        SourceType::Docker
    }

    fn start_delay(&self) -> Duration {
        self.start_delay
    }

    async fn deploy(
        &self,
        deployment: &str,
        version: &str,
    ) -> Result<DeploymentStatus, AgentError> {
        if let Err(err) = self.engine.stop(deployment).await {
            tracing::debug!(deployment, error = %err, "No previous container to stop");
        }
        self.engine.create(deployment, version).await?;
        self.engine.start(deployment).await?;
        Ok(self.health.confirm(DeploymentStatus::Deployed).await)
    }

    async fn start(&self, deployment: &str) -> Result<DeploymentStatus, AgentError> {
        self.engine.start(deployment).await?;
        Ok(self.health.confirm(DeploymentStatus::Deployed).await)
    }

    async fn stop(&self, deployment: &str) -> Result<DeploymentStatus, AgentError> {
        let was_running = self.engine.stop(deployment).await?;
        Ok(if was_running {
            DeploymentStatus::Stopped
        } else {
            DeploymentStatus::UnknownStopped
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::runtime::RuntimeError;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct FakeEngine {
        exists: bool,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RuntimeAdapter for FakeEngine {
        async fn create(&self, deployment: &str, version: &str) -> Result<(), RuntimeError> {
            self.calls.lock().push(format!("create {deployment} {version}"));
            Ok(())
        }

        async fn start(&self, deployment: &str) -> Result<(), RuntimeError> {
            self.calls.lock().push(format!("start {deployment}"));
            Ok(())
        }

        async fn stop(&self, deployment: &str) -> Result<bool, RuntimeError> {
            self.calls.lock().push(format!("stop {deployment}"));
            if self.exists {
                Ok(true)
            } else {
                Err(RuntimeError::Unsupported("no such container"))
            }
        }
    }

    #[tokio::test]
    async fn deploy_replaces_the_previous_container() {
        let engine = Arc::new(FakeEngine {
            exists: true,
            ..FakeEngine::default()
        });
        let strategy = ContainerStrategy::new(
            Arc::clone(&engine) as Arc<dyn RuntimeAdapter>,
            HealthGate::disabled(),
            Duration::from_millis(1),
        );

        let status = strategy.deploy("app", "2.0.0").await.unwrap();
        assert_eq!(status, DeploymentStatus::Deployed);
        assert_eq!(
            engine.calls.lock().as_slice(),
            &[
                "stop app".to_string(),
                "create app 2.0.0".to_string(),
                "start app".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn deploy_tolerates_missing_previous_container() {
        let engine = Arc::new(FakeEngine::default());
        let strategy = ContainerStrategy::new(
            Arc::clone(&engine) as Arc<dyn RuntimeAdapter>,
            HealthGate::disabled(),
            Duration::from_millis(1),
        );

        let status = strategy.deploy("app", "2.0.0").await.unwrap();
        assert_eq!(status, DeploymentStatus::Deployed);
    }
}
