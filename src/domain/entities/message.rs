//! Direct message entity and repository trait.
//!
//! Maps to the `messages` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Maximum message content length in characters.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Number of messages returned for one conversation.
pub const CHAT_HISTORY_LIMIT: i64 = 50;

/// Represents a directed text message between two users.
///
/// Maps to the `messages` table:
/// - id: UUID PRIMARY KEY DEFAULT gen_random_uuid()
/// - sender_id: UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// - receiver_id: UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// - content: VARCHAR(2000) NOT NULL
/// - read: BOOLEAN NOT NULL DEFAULT FALSE
/// - deleted: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at, updated_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectMessage {
    pub id: Uuid,

    /// Author of the message
    pub sender_id: Uuid,

    /// Addressee of the message
    pub receiver_id: Uuid,

    /// Trimmed text content (1-2000 characters)
    pub content: String,

    /// Set by the receiver-side bulk read sweep
    pub read: bool,

    /// Soft-delete flag set by the sender
    pub deleted: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl DirectMessage {
    /// The other participant, seen from `user_id`.
    pub fn peer_of(&self, user_id: Uuid) -> Uuid {
        if self.sender_id == user_id {
            self.receiver_id
        } else {
            self.sender_id
        }
    }

    /// Whether the message is still unread by `user_id`.
    pub fn is_unread_by(&self, user_id: Uuid) -> bool {
        self.receiver_id == user_id && !self.read && !self.deleted
    }
}

/// Fields supplied when persisting a message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
}

/// Repository trait for DirectMessage data access operations.
///
/// Every listing skips soft-deleted rows.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a new message with `read = false` and `deleted = false`.
    async fn create(&self, message: NewMessage) -> Result<DirectMessage, AppError>;

    /// Find a message by id, including soft-deleted ones.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<DirectMessage>, AppError>;

    /// The `limit` most recent messages between two users, returned oldest first.
    async fn list_between(
        &self,
        user_a: Uuid,
        user_b: Uuid,
        limit: i64,
    ) -> Result<Vec<DirectMessage>, AppError>;

    /// Flag every unread message from `sender` to `receiver` as read.
    async fn mark_read(&self, sender: Uuid, receiver: Uuid) -> Result<u64, AppError>;

    /// Soft-delete a message if `sender` wrote it. Returns false otherwise.
    async fn soft_delete(&self, id: Uuid, sender: Uuid) -> Result<bool, AppError>;

    /// Latest message per conversation partner of `user`, newest first.
    async fn latest_per_peer(&self, user: Uuid) -> Result<Vec<DirectMessage>, AppError>;

    /// Unread inbound message counts of `user`, grouped by sender.
    async fn unread_counts_by_sender(&self, user: Uuid) -> Result<Vec<(Uuid, i64)>, AppError>;

    /// Every user `user` has exchanged messages with.
    async fn partner_ids(&self, user: Uuid) -> Result<Vec<Uuid>, AppError>;

    /// Number of unread inbound messages of `user`.
    async fn count_unread(&self, user: Uuid) -> Result<i64, AppError>;
}
