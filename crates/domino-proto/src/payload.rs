//! Typed payloads for each message type.

use serde::{Deserialize, Serialize};

use domino_core::{DeploymentStatus, LifecycleCommand, SourceType};

/// `ANNOUNCEMENT` payload: the agent's self-identification triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementPayload {
    /// The configured key naming this agent on its host.
    #[serde(rename = "agentKey")]
    pub agent_key: String,
    /// The host the agent runs on.
    #[serde(rename = "hostID")]
    pub host_id: String,
    /// The runtime kind the agent executes deployments with.
    #[serde(rename = "sourceType")]
    pub source_type: SourceType,
}

/// `CONFIRMATION` payload: coordinator acknowledgement of a tracked agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationPayload {
    /// Human-readable confirmation; carries the derived agent URI.
    pub message: String,
}

/// `LIFECYCLE` payload: a deployment command issued by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecyclePayload {
    /// The command to execute.
    pub command: LifecycleCommand,
    /// The deployment the command targets.
    pub deployment: String,
    /// Version to deploy; only meaningful for `DEPLOY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// `RESULT` payload: the terminal status of an executed command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPayload {
    /// Terminal status of the operation.
    pub status: DeploymentStatus,
    /// The command this result answers.
    #[serde(rename = "deployOperation")]
    pub deploy_operation: LifecycleCommand,
    /// Version reported by a deploy operation, if any.
    #[serde(
        rename = "deployedVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub deployed_version: Option<String>,
}

/// `FAILURE` payload: the command could not be executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailurePayload {
    /// Diagnostic message describing the failure.
    pub message: String,
}
