//! The wire envelope.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ProtoError, Result};
use crate::message::MessageType;

/// One protocol frame: `{messageID, messageType, payload}`.
///
/// The payload is kept as raw JSON here; each handler parses it into the
/// typed payload struct it expects, so one malformed payload never poisons
/// dispatch for other message types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Correlation key for request/response pairs; a locally generated
    /// token for unsolicited messages.
    #[serde(rename = "messageID")]
    pub message_id: String,
    /// The message type, one of the closed [`MessageType`] set.
    #[serde(rename = "messageType")]
    pub message_type: MessageType,
    /// Type-specific payload, absent for ping/pong.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl Envelope {
    /// Build an envelope with a freshly generated message ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload fails to serialize.
    pub fn new<T: Serialize>(message_type: MessageType, payload: &T) -> Result<Self> {
        Ok(Self {
            message_id: uuid::Uuid::new_v4().to_string(),
            message_type,
            payload: Some(serde_json::to_value(payload)?),
        })
    }

    /// Build a payload-less envelope (ping/pong) with a generated ID.
    #[must_use]
    pub fn empty(message_type: MessageType) -> Self {
        Self {
            message_id: uuid::Uuid::new_v4().to_string(),
            message_type,
            payload: None,
        }
    }

    /// Build a reply that reuses this envelope's message ID.
    ///
    /// Results and failures answer a lifecycle command on the same
    /// correlation ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload fails to serialize.
    pub fn reply<T: Serialize>(&self, message_type: MessageType, payload: &T) -> Result<Self> {
        Ok(Self {
            message_id: self.message_id.clone(),
            message_type,
            payload: Some(serde_json::to_value(payload)?),
        })
    }

    /// Build a payload-less reply that reuses this envelope's message ID.
    #[must_use]
    pub fn reply_empty(&self, message_type: MessageType) -> Self {
        Self {
            message_id: self.message_id.clone(),
            message_type,
            payload: None,
        }
    }

    /// Parse the payload into the type the handler expects.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is absent or does not match `T`.
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T> {
        let payload = self
            .payload
            .as_ref()
            .ok_or(ProtoError::MissingPayload(self.message_type.as_str()))?;
        Ok(serde_json::from_value(payload.clone())?)
    }

    /// Serialize the envelope into one text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_frame(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a text frame into an envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is not a valid envelope or carries an
    /// unknown message type.
    pub fn from_frame(frame: &str) -> Result<Self> {
        Ok(serde_json::from_str(frame)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::AnnouncementPayload;
    use domino_core::SourceType;

    #[test]
    fn frame_roundtrip() {
        let payload = AnnouncementPayload {
            agent_key: "k1".to_string(),
            host_id: "h1".to_string(),
            source_type: SourceType::Docker,
        };
        let envelope = Envelope::new(MessageType::Announcement, &payload).unwrap();
        let frame = envelope.to_frame().unwrap();

        let parsed = Envelope::from_frame(&frame).unwrap();
        assert_eq!(parsed.message_id, envelope.message_id);
        assert_eq!(parsed.message_type, MessageType::Announcement);

        let parsed_payload: AnnouncementPayload = parsed.parse_payload().unwrap();
        assert_eq!(parsed_payload, payload);
    }

    #[test]
    fn empty_envelope_has_no_payload_field() {
        let envelope = Envelope::empty(MessageType::Ping);
        let frame = envelope.to_frame().unwrap();
        assert!(!frame.contains("payload"));
        assert!(frame.contains("\"messageType\":\"PING\""));
    }

    #[test]
    fn reply_reuses_message_id() {
        let command = Envelope::empty(MessageType::Lifecycle);
        let reply = command
            .reply(
                MessageType::Failure,
                &crate::payload::FailurePayload {
                    message: "boom".to_string(),
                },
            )
            .unwrap();
        assert_eq!(reply.message_id, command.message_id);
        assert_eq!(reply.message_type, MessageType::Failure);
    }

    #[test]
    fn missing_payload_is_an_error() {
        let envelope = Envelope::empty(MessageType::Pong);
        let result: Result<AnnouncementPayload> = envelope.parse_payload();
        assert!(matches!(result, Err(ProtoError::MissingPayload("PONG"))));
    }

    #[test]
    fn unknown_message_type_fails_frame_parse() {
        let frame = r#"{"messageID":"m-1","messageType":"TELEMETRY","payload":null}"#;
        assert!(Envelope::from_frame(frame).is_err());
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = Envelope::empty(MessageType::Ping);
        let b = Envelope::empty(MessageType::Ping);
        assert_ne!(a.message_id, b.message_id);
    }
}
