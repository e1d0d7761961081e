//! Message Service
//!
//! Direct messages between two users. Every write goes to the store first;
//! the relay publish that follows is best effort, so a message is always
//! retrievable over REST whether or not its recipient was connected.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::dto::response::{
    ConversationDto, MessageDto, UnreadMessagesResponse, UserSummary,
};
use crate::application::events::{EventPublisher, RelayEvent};
use crate::domain::{
    DirectMessage, MessageRepository, NewMessage, UserRepository, CHAT_HISTORY_LIMIT,
    MAX_MESSAGE_LENGTH,
};
use crate::shared::error::AppError;

/// Message service trait for dependency injection
#[async_trait]
pub trait MessageService: Send + Sync {
    /// Persist a message and publish it to the receiver's topic.
    async fn send(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: &str,
    ) -> Result<MessageDto, MessageError>;

    /// Flag messages from `peer_id` as read and notify the peer.
    async fn mark_read(&self, user_id: Uuid, peer_id: Uuid) -> Result<u64, MessageError>;

    /// Latest message and unread count per conversation partner.
    async fn conversations(&self, user_id: Uuid) -> Result<Vec<ConversationDto>, MessageError>;

    /// Recent history with `peer_id`, oldest first. Marks the peer's
    /// messages read.
    async fn chat(&self, user_id: Uuid, peer_id: Uuid) -> Result<Vec<MessageDto>, MessageError>;

    /// Soft-delete a message the caller sent.
    async fn delete(&self, user_id: Uuid, message_id: Uuid) -> Result<(), MessageError>;

    /// Everyone the caller has exchanged messages with.
    async fn potential_chats(&self, user_id: Uuid) -> Result<Vec<UserSummary>, MessageError>;

    /// Unread inbound message counter.
    async fn unread(&self, user_id: Uuid) -> Result<UnreadMessagesResponse, MessageError>;
}

/// Message service errors
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Invalid message data")]
    InvalidContent,

    #[error("Message must be at most 2000 characters")]
    ContentTooLong,

    #[error("Receiver not found")]
    ReceiverNotFound,

    #[error("Message not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl MessageError {
    /// Whether the error was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, MessageError::Store(_))
    }
}

impl From<MessageError> for AppError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::InvalidContent | MessageError::ContentTooLong => {
                AppError::BadRequest(err.to_string())
            }
            MessageError::ReceiverNotFound | MessageError::NotFound => {
                AppError::NotFound(err.to_string())
            }
            MessageError::Store(e) => e,
        }
    }
}

/// Trim content and check it is non-empty and within the length limit.
pub fn normalize_content(content: &str) -> Result<&str, MessageError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(MessageError::InvalidContent);
    }
    if content.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(MessageError::ContentTooLong);
    }
    Ok(content)
}

/// MessageService implementation
pub struct MessageServiceImpl {
    messages: Arc<dyn MessageRepository>,
    users: Arc<dyn UserRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl MessageServiceImpl {
    /// Create a new MessageServiceImpl
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        users: Arc<dyn UserRepository>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            messages,
            users,
            publisher,
        }
    }

    async fn summaries(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>, MessageError> {
        Ok(self
            .users
            .find_by_ids(ids)
            .await?
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect())
    }

    /// Attach sender and receiver display fields. Messages whose
    /// participants no longer exist are skipped.
    async fn populate(&self, messages: Vec<DirectMessage>) -> Result<Vec<MessageDto>, MessageError> {
        let mut ids: Vec<Uuid> = messages
            .iter()
            .flat_map(|m| [m.sender_id, m.receiver_id])
            .collect();
        ids.sort_unstable();
        ids.dedup();
        let users = self.summaries(&ids).await?;

        Ok(messages
            .into_iter()
            .filter_map(|m| {
                let sender = users.get(&m.sender_id)?.clone();
                let receiver = users.get(&m.receiver_id)?.clone();
                Some(MessageDto::new(m, sender, receiver))
            })
            .collect())
    }

    async fn sweep_read(&self, user_id: Uuid, peer_id: Uuid) -> Result<u64, MessageError> {
        let updated = self.messages.mark_read(peer_id, user_id).await?;
        self.publisher
            .publish(peer_id, RelayEvent::MessagesRead { reader: user_id })
            .await;
        Ok(updated)
    }
}

#[async_trait]
impl MessageService for MessageServiceImpl {
    async fn send(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: &str,
    ) -> Result<MessageDto, MessageError> {
        let content = normalize_content(content)?;

        self.users
            .find_by_id(receiver_id)
            .await?
            .ok_or(MessageError::ReceiverNotFound)?;

        let message = self
            .messages
            .create(NewMessage {
                sender_id,
                receiver_id,
                content: content.to_string(),
            })
            .await?;

        let dto = self
            .populate(vec![message])
            .await?
            .pop()
            .ok_or(MessageError::ReceiverNotFound)?;

        tracing::debug!(message_id = %dto.id, %sender_id, %receiver_id, "Message persisted");

        self.publisher
            .publish(receiver_id, RelayEvent::ReceiveMessage(dto.clone()))
            .await;

        Ok(dto)
    }

    async fn mark_read(&self, user_id: Uuid, peer_id: Uuid) -> Result<u64, MessageError> {
        self.sweep_read(user_id, peer_id).await
    }

    async fn conversations(&self, user_id: Uuid) -> Result<Vec<ConversationDto>, MessageError> {
        let latest = self.messages.latest_per_peer(user_id).await?;
        let unread: HashMap<Uuid, i64> = self
            .messages
            .unread_counts_by_sender(user_id)
            .await?
            .into_iter()
            .collect();

        Ok(self
            .populate(latest)
            .await?
            .into_iter()
            .map(|last_message| {
                let user = if last_message.sender.id == user_id {
                    last_message.receiver.clone()
                } else {
                    last_message.sender.clone()
                };
                ConversationDto {
                    unread_count: unread.get(&user.id).copied().unwrap_or(0),
                    user,
                    last_message,
                }
            })
            .collect())
    }

    async fn chat(&self, user_id: Uuid, peer_id: Uuid) -> Result<Vec<MessageDto>, MessageError> {
        let history = self
            .messages
            .list_between(user_id, peer_id, CHAT_HISTORY_LIMIT)
            .await?;
        let history = self.populate(history).await?;

        let unread_from_peer = history
            .iter()
            .any(|m| m.sender.id == peer_id && m.receiver.id == user_id && !m.read);
        if unread_from_peer {
            self.sweep_read(user_id, peer_id).await?;
        }

        Ok(history)
    }

    async fn delete(&self, user_id: Uuid, message_id: Uuid) -> Result<(), MessageError> {
        if !self.messages.soft_delete(message_id, user_id).await? {
            return Err(MessageError::NotFound);
        }
        tracing::debug!(%message_id, %user_id, "Message soft-deleted");
        Ok(())
    }

    async fn potential_chats(&self, user_id: Uuid) -> Result<Vec<UserSummary>, MessageError> {
        let ids = self.messages.partner_ids(user_id).await?;
        Ok(self
            .users
            .find_by_ids(&ids)
            .await?
            .iter()
            .map(UserSummary::from)
            .collect())
    }

    async fn unread(&self, user_id: Uuid) -> Result<UnreadMessagesResponse, MessageError> {
        let count = self.messages.count_unread(user_id).await?;
        Ok(UnreadMessagesResponse {
            has_unread: count > 0,
            count,
        })
    }
}
