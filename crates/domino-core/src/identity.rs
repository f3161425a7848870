//! Agent identity types.
//!
//! An agent is identified by the `{agent_key, host_id, source_type}` triple.
//! The triple is loaded once from static configuration on the coordinator and
//! never mutated; the derived URI form is used for display and attribution.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The runtime kind an agent uses to execute deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Plain binary process managed directly by the agent.
    Process,
    /// Service managed through the host's service manager.
    Service,
    /// Container managed through a container engine.
    Docker,
}

impl SourceType {
    /// Return the lowercase wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Service => "service",
            Self::Docker => "docker",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = SourceTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "process" => Ok(Self::Process),
            "service" => Ok(Self::Service),
            "docker" => Ok(Self::Docker),
            other => Err(SourceTypeParseError(other.to_string())),
        }
    }
}

/// Error returned when parsing an unknown source type string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown source type: {0}")]
pub struct SourceTypeParseError(pub String);

/// A coordinator-known agent identity.
///
/// Immutable once constructed. The registry looks identities up by the full
/// triple; the derived [`AgentIdentity::agent_id`] URI is used for logging,
/// confirmation messages, and the `X-Agent-ID` handshake header.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentIdentity {
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

impl AgentIdentity {
    /// Create a new identity from its parts.
    #[must_use]
    pub fn new(
        agent_key: impl Into<String>,
        host_id: impl Into<String>,
        source_type: SourceType,
    ) -> Self {
        Self {
            agent_key: agent_key.into(),
            host_id: host_id.into(),
            source_type,
        }
    }

    /// Derive the URI-shaped agent identifier.
    ///
    /// Format: `domino-agent://{host_id}/{source_type}/{agent_key}`.
    #[must_use]
    pub fn agent_id(&self) -> String {
        format!(
            "domino-agent://{}/{}/{}",
            self.host_id, self.source_type, self.agent_key
        )
    }
}

impl fmt::Display for AgentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.agent_id())
    }
}
