//! Deployment lifecycle statuses, commands, and operation results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal status of a lifecycle operation on a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentStatus {
    /// The deployment is running (no healthcheck configured to say more).
    Deployed,
    /// The deployment was stopped by the requested operation.
    Stopped,
    /// The deployment was not running when a stop was requested.
    UnknownStopped,
    /// The deployment came up and its healthcheck endpoint answered 200.
    HealthCheckOk,
    /// The healthcheck endpoint never answered 200 within the attempt budget.
    HealthCheckFailure,
    /// The operation failed before or during execution.
    Failure,
    /// The coordinator gave up waiting for a result.
    Timeout,
}

impl DeploymentStatus {
    /// Whether this status belongs to the stopped family.
    ///
    /// A restart only proceeds to its start phase when the stop phase landed
    /// in this family.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped | Self::UnknownStopped)
    }

    /// Whether this status reports a successful operation.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(
            self,
            Self::Deployed | Self::Stopped | Self::UnknownStopped | Self::HealthCheckOk
        )
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Deployed => "DEPLOYED",
            Self::Stopped => "STOPPED",
            Self::UnknownStopped => "UNKNOWN_STOPPED",
            Self::HealthCheckOk => "HEALTH_CHECK_OK",
            Self::HealthCheckFailure => "HEALTH_CHECK_FAILURE",
            Self::Failure => "FAILURE",
            Self::Timeout => "TIMEOUT",
        };
        f.write_str(s)
    }
}

/// A deployment lifecycle command issued by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LifecycleCommand {
    /// Deploy a specific version of the deployment.
    Deploy,
    /// Start the deployment.
    Start,
    /// Stop the deployment.
    Stop,
    /// Stop, then start the deployment.
    Restart,
}

impl fmt::Display for LifecycleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Deploy => "DEPLOY",
            Self::Start => "START",
            Self::Stop => "STOP",
            Self::Restart => "RESTART",
        };
        f.write_str(s)
    }
}

/// The terminal outcome of one in-flight lifecycle operation.
///
/// Every command the coordinator sends resolves to exactly one of these:
/// a result carried back by the agent, a failure-derived result, or a
/// locally decided timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    /// Terminal status of the operation.
    pub status: DeploymentStatus,
    /// The command this result answers.
    #[serde(rename = "deployOperation")]
    pub deploy_operation: LifecycleCommand,
    /// Version reported by a deploy operation, if any.
    #[serde(rename = "deployedVersion", skip_serializing_if = "Option::is_none")]
    pub deployed_version: Option<String>,
    /// Diagnostic message carried by failure-derived results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OperationResult {
    /// Build a result from a status reported by the agent.
    #[must_use]
    pub const fn reported(
        status: DeploymentStatus,
        deploy_operation: LifecycleCommand,
        deployed_version: Option<String>,
    ) -> Self {
        Self {
            status,
            deploy_operation,
            deployed_version,
            message: None,
        }
    }

    /// Build a failure-derived result for a command.
    #[must_use]
    pub fn failed(deploy_operation: LifecycleCommand, message: impl Into<String>) -> Self {
        Self {
            status: DeploymentStatus::Failure,
            deploy_operation,
            deployed_version: None,
            message: Some(message.into()),
        }
    }

    /// Build the locally decided timeout result for a command.
    #[must_use]
    pub const fn timed_out(deploy_operation: LifecycleCommand) -> Self {
        Self {
            status: DeploymentStatus::Timeout,
            deploy_operation,
            deployed_version: None,
            message: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_family() {
        assert!(DeploymentStatus::Stopped.is_stopped());
        assert!(DeploymentStatus::UnknownStopped.is_stopped());
        assert!(!DeploymentStatus::Deployed.is_stopped());
        assert!(!DeploymentStatus::HealthCheckOk.is_stopped());
        assert!(!DeploymentStatus::Timeout.is_stopped());
    }

    #[test]
    fn success_statuses() {
        assert!(DeploymentStatus::Deployed.is_success());
        assert!(DeploymentStatus::HealthCheckOk.is_success());
        assert!(!DeploymentStatus::HealthCheckFailure.is_success());
        assert!(!DeploymentStatus::Failure.is_success());
        assert!(!DeploymentStatus::Timeout.is_success());
    }

    #[test]
    fn status_wire_names() {
        let json = serde_json::to_string(&DeploymentStatus::UnknownStopped).unwrap();
        assert_eq!(json, "\"UNKNOWN_STOPPED\"");
        let json = serde_json::to_string(&DeploymentStatus::HealthCheckOk).unwrap();
        assert_eq!(json, "\"HEALTH_CHECK_OK\"");
    }

    #[test]
    fn command_wire_names() {
        let json = serde_json::to_string(&LifecycleCommand::Restart).unwrap();
        assert_eq!(json, "\"RESTART\"");
        let parsed: LifecycleCommand = serde_json::from_str("\"DEPLOY\"").unwrap();
        assert_eq!(parsed, LifecycleCommand::Deploy);
    }

    #[test]
    fn timed_out_result() {
        let result = OperationResult::timed_out(LifecycleCommand::Start);
        assert_eq!(result.status, DeploymentStatus::Timeout);
        assert_eq!(result.deploy_operation, LifecycleCommand::Start);
        assert!(result.deployed_version.is_none());
    }

    #[test]
    fn failed_result_carries_message() {
        let result = OperationResult::failed(LifecycleCommand::Deploy, "runtime missing");
        assert_eq!(result.status, DeploymentStatus::Failure);
        assert_eq!(result.message.as_deref(), Some("runtime missing"));
    }

    #[test]
    fn result_serde_omits_absent_fields() {
        let result = OperationResult::reported(DeploymentStatus::Stopped, LifecycleCommand::Stop, None);
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("deployedVersion").is_none());
        assert!(json.get("message").is_none());
        assert_eq!(json["deployOperation"], "STOP");
    }
}
