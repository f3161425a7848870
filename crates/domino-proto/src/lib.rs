//! Wire protocol for the domino coordinator↔agent connection.
//!
//! Every frame on the persistent WebSocket connection carries one JSON
//! [`Envelope`]: `{messageID, messageType, payload}`. The `messageID` is the
//! correlation key for request/response pairs; for unsolicited messages it is
//! a locally generated token.
//!
//! Inbound frames are routed by the [`MessageDispatcher`], which maps each
//! [`MessageType`] to exactly one registered handler. Unknown or unregistered
//! types are logged and dropped, keeping the connection forward-compatible.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod message;
pub mod payload;

pub use dispatch::{MessageDispatcher, MessageHandler};
pub use envelope::Envelope;
pub use error::{ProtoError, Result};
pub use message::MessageType;
pub use payload::{
    AnnouncementPayload, ConfirmationPayload, FailurePayload, LifecyclePayload, ResultPayload,
};
