//! Runtime adapter boundary.
//!
//! Strategies decide *what* a lifecycle command means; adapters own *how*
//! the host actually does it (spawn a binary, talk to the service manager,
//! drive the container engine). Tests substitute adapters freely.

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a runtime adapter.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The underlying command could not be spawned.
    #[error("failed to run '{command}': {source}")]
    Spawn {
        /// The command that failed to start.
        command: String,
        /// The spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The underlying command ran and reported failure.
    #[error("'{command}' exited with {code:?}: {stderr}")]
    CommandFailed {
        /// The command that failed.
        command: String,
        /// Its exit code, if any.
        code: Option<i32>,
        /// Captured stderr, trimmed.
        stderr: String,
    },

    /// The adapter does not support this operation.
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),
}

/// Host-side primitives for one runtime kind.
#[async_trait]
pub trait RuntimeAdapter: Send + Sync {
    /// Prepare `version` of `deployment` on the host so a subsequent start
    /// launches it.
    async fn create(&self, deployment: &str, version: &str) -> Result<(), RuntimeError>;

    /// Start the deployment.
    async fn start(&self, deployment: &str) -> Result<(), RuntimeError>;

    /// Stop the deployment.
    ///
    /// Returns whether it was actually running; stopping something already
    /// stopped is not an error.
    async fn stop(&self, deployment: &str) -> Result<bool, RuntimeError>;
}
