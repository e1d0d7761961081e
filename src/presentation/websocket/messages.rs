//! WebSocket Message Types
//!
//! Frames are JSON objects `{"event": <name>, "data": <payload>}`.
//! Outbound frames also carry `seq`, stamped per connection.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::dto::response::MessageDto;
use crate::application::events::RelayEvent;

/// Events a client may send
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    SendMessage(SendMessagePayload),
    MarkRead(MarkReadPayload),
}

/// Payload of `send_message`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub receiver_id: Uuid,
    #[serde(default)]
    pub content: String,
}

/// Payload of `mark_read`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadPayload {
    pub sender_id: Uuid,
}

/// Events the server sends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A message addressed to this user was persisted
    ReceiveMessage(MessageDto),

    /// Acknowledgement of this connection's `send_message`
    MessageSent(MessageDto),

    /// This connection's `send_message` failed, or a frame was unreadable
    MessageError { error: String },

    /// `reader` has read the messages this user sent them
    MessagesRead { reader: Uuid },

    /// This connection's `mark_read` failed
    ReadError { error: String },
}

impl ServerEvent {
    pub fn message_error(error: impl Into<String>) -> Self {
        ServerEvent::MessageError {
            error: error.into(),
        }
    }

    pub fn read_error(error: impl Into<String>) -> Self {
        ServerEvent::ReadError {
            error: error.into(),
        }
    }

    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::ReceiveMessage(_) => "receive_message",
            ServerEvent::MessageSent(_) => "message_sent",
            ServerEvent::MessageError { .. } => "message_error",
            ServerEvent::MessagesRead { .. } => "messages_read",
            ServerEvent::ReadError { .. } => "read_error",
        }
    }
}

impl From<RelayEvent> for ServerEvent {
    fn from(event: RelayEvent) -> Self {
        match event {
            RelayEvent::ReceiveMessage(message) => ServerEvent::ReceiveMessage(message),
            RelayEvent::MessagesRead { reader } => ServerEvent::MessagesRead { reader },
        }
    }
}

/// Outbound frame
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub seq: u64,
    #[serde(flatten)]
    pub event: ServerEvent,
}
