//! The closed set of protocol message types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProtoError;

/// Message types carried on the coordinator↔agent connection.
///
/// Direction is agent→coordinator unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// Agent self-identification sent on connect.
    Announcement,
    /// Keep-alive probe; both sides use ping/pong symmetrically.
    Ping,
    /// Keep-alive answer.
    Pong,
    /// Terminal outcome of a lifecycle command.
    Result,
    /// Failure outcome of a lifecycle command.
    Failure,
    /// Coordinator→agent acknowledgement of a tracked announcement.
    Confirmation,
    /// Coordinator→agent lifecycle command.
    Lifecycle,
}

impl MessageType {
    /// Return the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Announcement => "ANNOUNCEMENT",
            Self::Ping => "PING",
            Self::Pong => "PONG",
            Self::Result => "RESULT",
            Self::Failure => "FAILURE",
            Self::Confirmation => "CONFIRMATION",
            Self::Lifecycle => "LIFECYCLE",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ANNOUNCEMENT" => Ok(Self::Announcement),
            "PING" => Ok(Self::Ping),
            "PONG" => Ok(Self::Pong),
            "RESULT" => Ok(Self::Result),
            "FAILURE" => Ok(Self::Failure),
            "CONFIRMATION" => Ok(Self::Confirmation),
            "LIFECYCLE" => Ok(Self::Lifecycle),
            other => Err(ProtoError::UnknownMessageType(other.to_string())),
        }
    }
}
