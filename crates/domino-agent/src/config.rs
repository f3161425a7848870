//! Agent configuration.
//!
//! The agent is configured entirely through environment variables so it can
//! be dropped onto a host (or into a container) without a config file.

use std::time::Duration;

use domino_core::{AgentIdentity, SourceType};

use crate::error::AgentError;

/// Runtime configuration for one agent process.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Base WebSocket URL of the coordinator, e.g. `ws://coordinator:7075`.
    pub coordinator_url: String,
    /// Shared API key presented during the connection handshake.
    pub api_key: String,
    /// The key naming this agent on its host.
    pub agent_key: String,
    /// The host this agent runs on.
    pub host_id: String,
    /// The runtime kind this agent executes deployments with.
    pub source_type: SourceType,
    /// Seconds between keep-alive pings.
    pub ping_interval_seconds: u64,
    /// Seconds to wait for a pong before treating the link as dead.
    pub pong_timeout_seconds: u64,
    /// Seconds to wait between stop and start during a restart.
    pub start_delay_seconds: u64,
    /// Maximum healthcheck probe attempts after a start or deploy.
    pub healthcheck_max_attempts: u32,
    /// Seconds between healthcheck probe attempts.
    pub healthcheck_interval_seconds: u64,
    /// URL probed to confirm the application is serving; when unset, no
    /// healthcheck runs and start/deploy report their plain status.
    pub healthcheck_url: Option<String>,
}

impl AgentConfig {
    /// Load the configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, AgentError> {
        let source_type = required("SOURCE_TYPE")?
            .parse::<SourceType>()
            .map_err(|err| AgentError::Config(err.to_string()))?;

        Ok(Self {
            coordinator_url: required("COORDINATOR_URL")?,
            api_key: required("API_KEY")?,
            agent_key: required("AGENT_KEY")?,
            host_id: required("HOST_ID")?,
            source_type,
            ping_interval_seconds: optional_u64("PING_INTERVAL_SECONDS", 30)?,
            pong_timeout_seconds: optional_u64("PONG_TIMEOUT_SECONDS", 10)?,
            start_delay_seconds: optional_u64("START_DELAY_SECONDS", 3)?,
            healthcheck_max_attempts: u32::try_from(optional_u64(
                "HEALTHCHECK_MAX_ATTEMPTS",
                5,
            )?)
            .map_err(|_| AgentError::Config("HEALTHCHECK_MAX_ATTEMPTS out of range".into()))?,
            healthcheck_interval_seconds: optional_u64("HEALTHCHECK_INTERVAL_SECONDS", 5)?,
            healthcheck_url: std::env::var("HEALTHCHECK_URL").ok(),
        })
    }

    /// The identity triple this agent announces.
    #[must_use]
    pub fn identity(&self) -> AgentIdentity {
        AgentIdentity::new(&self.agent_key, &self.host_id, self.source_type)
    }

    /// The derived agent URI, used as the `X-Agent-ID` handshake header.
    #[must_use]
    pub fn agent_id(&self) -> String {
        self.identity().agent_id()
    }

    /// Interval between keep-alive pings.
    #[must_use]
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_seconds)
    }

    /// How long to wait for a pong after each ping.
    #[must_use]
    pub fn pong_timeout(&self) -> Duration {
        Duration::from_secs(self.pong_timeout_seconds)
    }

    /// Pause between stop and start during a restart.
    #[must_use]
    pub fn start_delay(&self) -> Duration {
        Duration::from_secs(self.start_delay_seconds)
    }

    /// Interval between healthcheck probes.
    #[must_use]
    pub fn healthcheck_interval(&self) -> Duration {
        Duration::from_secs(self.healthcheck_interval_seconds)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            coordinator_url: "ws://127.0.0.1:7075".to_string(),
            api_key: String::new(),
            agent_key: "agent".to_string(),
            host_id: "localhost".to_string(),
            source_type: SourceType::Process,
            ping_interval_seconds: 30,
            pong_timeout_seconds: 10,
            start_delay_seconds: 3,
            healthcheck_max_attempts: 5,
            healthcheck_interval_seconds: 5,
            healthcheck_url: None,
        }
    }
}

fn required(name: &'static str) -> Result<String, AgentError> {
    std::env::var(name).map_err(|_| AgentError::Config(format!("{name} must be set")))
}

fn optional_u64(name: &'static str, default: u64) -> Result<u64, AgentError> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| AgentError::Config(format!("{name} must be a number"))),
        Err(_) => Ok(default),
    }
}
