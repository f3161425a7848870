//! Shared state threaded through the startup pipeline and message handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use domino_proto::Envelope;

use crate::error::AgentError;

/// Where the agent is in its startup lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentStatus {
    /// Process started, not yet connected.
    #[default]
    Initializing,
    /// Connected and announcement sent; awaiting confirmation.
    Announced,
    /// Confirmed by the coordinator; ready for lifecycle commands.
    Listening,
}

/// Link state updated concurrently by the read loop and the keep-alive task.
#[derive(Debug, Default)]
pub struct LinkState {
    status: RwLock<AgentStatus>,
    ping_confirmed: AtomicBool,
}

impl LinkState {
    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> AgentStatus {
        *self.status.read()
    }

    /// Advance the lifecycle status.
    pub fn set_status(&self, status: AgentStatus) {
        *self.status.write() = status;
    }

    /// Whether a pong arrived since the flag was last cleared.
    #[must_use]
    pub fn ping_confirmed(&self) -> bool {
        self.ping_confirmed.load(Ordering::SeqCst)
    }

    /// Set or clear the pong-received flag.
    pub fn set_ping_confirmed(&self, confirmed: bool) {
        self.ping_confirmed.store(confirmed, Ordering::SeqCst);
    }
}

/// Outbound handle to the coordinator.
///
/// Frames are queued to a dedicated writer task, so any number of handlers
/// can send concurrently while writes to the socket stay ordered.
#[derive(Debug, Clone)]
pub struct CoordinatorLink {
    tx: mpsc::Sender<String>,
}

impl CoordinatorLink {
    /// Wrap the writer-task channel.
    #[must_use]
    pub fn new(tx: mpsc::Sender<String>) -> Self {
        Self { tx }
    }

    /// Serialize and queue one envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the writer task is gone.
    pub async fn send_envelope(&self, envelope: &Envelope) -> Result<(), AgentError> {
        let frame = envelope.to_frame()?;
        self.tx
            .send(frame)
            .await
            .map_err(|_| AgentError::LinkClosed)
    }
}

/// Mutable context handed through the startup pipeline.
///
/// Early tasks populate fields (headers, then the live link) that later
/// tasks depend on.
pub struct TaskContext {
    /// Agent configuration.
    pub config: crate::config::AgentConfig,
    /// Handshake headers, set by the header task.
    pub auth_headers: Option<Vec<(&'static str, String)>>,
    /// Live outbound link, set by the connect task.
    pub connection: Option<CoordinatorLink>,
    /// Link state shared with the read loop.
    pub link_state: Arc<LinkState>,
    /// Channel for unrecoverable errors raised by background tasks.
    pub fatal: mpsc::Sender<AgentError>,
}

impl TaskContext {
    /// Create a fresh context before any pipeline task has run.
    #[must_use]
    pub fn new(config: crate::config::AgentConfig, fatal: mpsc::Sender<AgentError>) -> Self {
        Self {
            config,
            auth_headers: None,
            connection: None,
            link_state: Arc::new(LinkState::default()),
            fatal,
        }
    }
}
