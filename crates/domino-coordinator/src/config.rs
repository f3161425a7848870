//! Coordinator configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use domino_core::AgentIdentity;

use crate::error::{CoordinatorError, Result};

/// Configuration for the coordinator process.
///
/// Loaded once at startup from a JSON file; the known-agents list is static
/// for the lifetime of the process.
#[derive(Debug, Clone, Deserialize)]
pub struct CoordinatorConfig {
    /// Listen address (e.g., "0.0.0.0:7075").
    #[serde(default = "CoordinatorConfig::default_listen_addr")]
    pub listen_addr: String,

    /// Hex-encoded blake3 hash of the shared agent API key.
    pub api_key_hash: String,

    /// Per-operation timeout in seconds; a single fixed duration applied to
    /// every in-flight command.
    #[serde(default = "CoordinatorConfig::default_operation_timeout")]
    pub operation_timeout_seconds: u64,

    /// The statically configured known-agents list.
    #[serde(default)]
    pub known_agents: Vec<AgentIdentity>,
}

impl CoordinatorConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:7075".to_string()
    }

    const fn default_operation_timeout() -> u64 {
        30
    }

    /// Get the operation timeout as a `Duration`.
    #[must_use]
    pub const fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_seconds)
    }

    /// Load the configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            CoordinatorError::Internal(format!("cannot read config {}: {err}", path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|err| {
            CoordinatorError::Internal(format!("cannot parse config {}: {err}", path.display()))
        })
    }

    /// Hash an API key the way the handshake comparison expects it.
    #[must_use]
    pub fn hash_api_key(key: &str) -> String {
        hex::encode(blake3::hash(key.as_bytes()).as_bytes())
    }

    /// Whether a presented API key matches the configured hash.
    #[must_use]
    pub fn api_key_matches(&self, presented: &str) -> bool {
        Self::hash_api_key(presented) == self.api_key_hash
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            api_key_hash: String::new(),
            operation_timeout_seconds: Self::default_operation_timeout(),
            known_agents: Vec::new(),
        }
    }
}
