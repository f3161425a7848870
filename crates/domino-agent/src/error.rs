//! Agent error types.

use thiserror::Error;

use domino_core::SourceType;
use domino_proto::ProtoError;

use crate::executor::RuntimeError;

/// Errors produced by the agent.
#[derive(Error, Debug)]
pub enum AgentError {
    /// A startup task reported failure; the pipeline stops here.
    #[error("task '{0}' failed")]
    TaskFailed(&'static str),

    /// A required configuration value is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The WebSocket connection to the coordinator could not be established.
    #[error("failed to connect to coordinator: {0}")]
    Connect(String),

    /// The link to the coordinator is gone; the agent cannot continue.
    #[error("coordinator link closed")]
    LinkClosed,

    /// A ping went unanswered within the pong timeout.
    #[error("ping not confirmed by coordinator")]
    PingNotConfirmed,

    /// No execution strategy is registered for the agent's runtime kind.
    #[error("no execution strategy for source type '{0}'")]
    UnknownExecutionType(SourceType),

    /// A deploy command arrived without a version.
    #[error("version is required for DEPLOY")]
    MissingVersion,

    /// The runtime adapter failed to act on the deployment.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// A protocol frame could not be built or parsed.
    #[error(transparent)]
    Proto(#[from] ProtoError),
}
