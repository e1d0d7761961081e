//! Relay Events
//!
//! Events fanned out to per-user topics after the store has been written.
//! A topic is named by the id of the user it addresses. Publishing is
//! at-most-once: an event with no subscriber is dropped, and the
//! underlying record stays readable over REST.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::dto::response::MessageDto;

/// An event published to a user's topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum RelayEvent {
    /// A message addressed to the topic owner was persisted
    ReceiveMessage(MessageDto),

    /// `reader` has read every message the topic owner sent them
    MessagesRead { reader: Uuid },
}

impl RelayEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            RelayEvent::ReceiveMessage(_) => "receive_message",
            RelayEvent::MessagesRead { .. } => "messages_read",
        }
    }
}

/// Publishes events to user topics.
///
/// Failures are logged by the implementation and never surface to the
/// caller: the store write that preceded the publish has already happened.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: Uuid, event: RelayEvent);
}

/// Receives events for topics with subscribers in this process.
pub trait EventSink: Send + Sync {
    /// Hand an event to every local subscriber of `topic`.
    /// Returns how many subscribers received it.
    fn deliver(&self, topic: Uuid, event: &RelayEvent) -> usize;
}
