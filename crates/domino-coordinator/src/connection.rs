//! Live connection identity and outbound handle.
//!
//! Each accepted WebSocket gets a generated [`ConnectionId`] and a
//! [`ConnectionHandle`] wrapping the sender side of the connection's outbound
//! channel. A dedicated writer task drains the channel onto the socket, so
//! frames are flushed in the order they were accepted.

use std::fmt;

use tokio::sync::mpsc;

use domino_proto::Envelope;

use crate::error::{CoordinatorError, Result};

/// Identifier for one live socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    /// Generate a fresh connection ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An outbound instruction for the connection's writer task.
#[derive(Debug)]
pub enum Outbound {
    /// Send one text frame.
    Frame(String),
    /// Close the socket after flushing queued frames.
    Close,
}

/// Sender half of one agent connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    tx: mpsc::Sender<Outbound>,
}

impl ConnectionHandle {
    /// Create a handle around the connection's outbound channel.
    #[must_use]
    pub const fn new(id: ConnectionId, tx: mpsc::Sender<Outbound>) -> Self {
        Self { id, tx }
    }

    /// The connection's identifier.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue one envelope for sending.
    ///
    /// Resolves once the frame is accepted by the writer task; frames are
    /// flushed in acceptance order.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionClosed` if the writer task has gone away, or a
    /// protocol error if the envelope fails to serialize.
    pub async fn send_envelope(&self, envelope: &Envelope) -> Result<()> {
        let frame = envelope.to_frame()?;
        self.tx
            .send(Outbound::Frame(frame))
            .await
            .map_err(|_| CoordinatorError::ConnectionClosed)
    }

    /// Ask the writer task to close the socket.
    ///
    /// Safe to call on an already-closing connection.
    pub async fn close(&self) {
        if self.tx.send(Outbound::Close).await.is_err() {
            tracing::debug!(connection = %self.id, "Close requested on a dead connection");
        }
    }
}
