//! Notification entity and repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// What an actor did to trigger a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Follow,
    Post,
}

impl NotificationKind {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "like" => Some(Self::Like),
            "follow" => Some(Self::Follow),
            "post" => Some(Self::Post),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Follow => "follow",
            Self::Post => "post",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A one-way event record from an actor to a recipient.
///
/// Maps to the `notifications` table:
/// - id: UUID PRIMARY KEY DEFAULT gen_random_uuid()
/// - from_user_id: UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// - to_user_id: UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// - kind: VARCHAR(16) NOT NULL CHECK (kind IN ('like', 'follow', 'post'))
/// - read: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,

    /// Actor
    pub from_user_id: Uuid,

    /// Recipient
    pub to_user_id: Uuid,

    pub kind: NotificationKind,

    pub read: bool,

    pub created_at: DateTime<Utc>,
}

/// Repository trait for Notification data access operations.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Record a notification for `to` caused by `from`.
    async fn create(
        &self,
        from: Uuid,
        to: Uuid,
        kind: NotificationKind,
    ) -> Result<Notification, AppError>;

    /// Find a notification by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>, AppError>;

    /// Notifications addressed to a user, newest first.
    async fn list_for(&self, recipient: Uuid) -> Result<Vec<Notification>, AppError>;

    /// Flag every unread notification of a user as read. Returns the number updated.
    async fn mark_all_read(&self, recipient: Uuid) -> Result<u64, AppError>;

    /// Number of unread notifications of a user.
    async fn count_unread(&self, recipient: Uuid) -> Result<i64, AppError>;

    /// Delete one notification.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    /// Delete every notification of a user. Returns the number removed.
    async fn delete_all_for(&self, recipient: Uuid) -> Result<u64, AppError>;
}
