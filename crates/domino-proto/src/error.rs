//! Protocol error types.

use thiserror::Error;

/// A result type using `ProtoError`.
pub type Result<T> = std::result::Result<T, ProtoError>;

/// Errors that can occur while encoding or decoding protocol frames.
#[derive(Debug, Error)]
pub enum ProtoError {
    /// The frame was not valid JSON or did not match the envelope shape.
    #[error("malformed envelope: {0}")]
    Json(#[from] serde_json::Error),

    /// The envelope carried a message type outside the closed set.
    #[error("unknown message type: {0}")]
    UnknownMessageType(String),

    /// A handler expected a payload the envelope did not carry.
    #[error("missing payload for {0} message")]
    MissingPayload(&'static str),
}
