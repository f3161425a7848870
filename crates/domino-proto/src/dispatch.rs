//! Delegating message dispatch.
//!
//! Decouples "a message of type X arrived" from "what to do about it". The
//! dispatcher owns a mapping from message type to exactly one handler, built
//! explicitly at startup. Unknown and unregistered types are logged and
//! dropped rather than failing the connection, keeping the protocol
//! forward-compatible.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::envelope::Envelope;
use crate::message::MessageType;

/// A handler for one message type.
///
/// `process` is infallible at the dispatcher boundary: a handler catches and
/// logs its own failures (malformed payload, send error) so one bad message
/// cannot take down the connection.
#[async_trait]
pub trait MessageHandler<C>: Send + Sync {
    /// Handle one inbound envelope in the given connection context.
    async fn process(&self, ctx: &C, envelope: Envelope);
}

/// Routes inbound frames to the one handler registered for their type.
pub struct MessageDispatcher<C> {
    handlers: HashMap<MessageType, Box<dyn MessageHandler<C>>>,
}

impl<C> Default for MessageDispatcher<C> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<C> MessageDispatcher<C> {
    /// Create an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for a message type, replacing any previous one.
    #[must_use]
    pub fn with_handler(
        mut self,
        message_type: MessageType,
        handler: Box<dyn MessageHandler<C>>,
    ) -> Self {
        self.handlers.insert(message_type, handler);
        self
    }

    /// Parse one raw text frame and route it to its handler.
    ///
    /// Frames that fail to parse (including unknown message types) and
    /// frames without a registered handler are logged and dropped.
    pub async fn dispatch(&self, ctx: &C, frame: &str) {
        let envelope = match Envelope::from_frame(frame) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(error = %err, "Dropping undecodable frame");
                return;
            }
        };

        match self.handlers.get(&envelope.message_type) {
            Some(handler) => handler.process(ctx, envelope).await,
            None => {
                tracing::warn!(
                    message_type = %envelope.message_type,
                    message_id = %envelope.message_id,
                    "No handler registered, dropping message"
                );
            }
        }
    }

    /// The number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
