//! Notification Service

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::dto::response::{NotificationView, UserSummary};
use crate::domain::{NotificationRepository, UserRepository};
use crate::shared::error::AppError;

/// Notification service trait for dependency injection
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Notifications of `user_id`, newest first. All are marked read afterwards.
    async fn list(&self, user_id: Uuid) -> Result<Vec<NotificationView>, NotificationError>;

    /// Number of unread notifications.
    async fn unread_count(&self, user_id: Uuid) -> Result<i64, NotificationError>;

    /// Delete one notification addressed to `user_id`.
    async fn delete(&self, user_id: Uuid, notification_id: Uuid) -> Result<(), NotificationError>;

    /// Delete every notification addressed to `user_id`.
    async fn delete_all(&self, user_id: Uuid) -> Result<u64, NotificationError>;
}

/// Notification service errors
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("No notifications found")]
    Empty,

    #[error("No notifications to delete")]
    NothingToDelete,

    #[error("Notification not found")]
    NotFound,

    #[error("You are not authorized to delete this notification")]
    Forbidden,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::Empty
            | NotificationError::NothingToDelete
            | NotificationError::NotFound => AppError::NotFound(err.to_string()),
            NotificationError::Forbidden => AppError::Forbidden(err.to_string()),
            NotificationError::Store(e) => e,
        }
    }
}

/// NotificationService implementation
pub struct NotificationServiceImpl {
    notifications: Arc<dyn NotificationRepository>,
    users: Arc<dyn UserRepository>,
}

impl NotificationServiceImpl {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            notifications,
            users,
        }
    }
}

#[async_trait]
impl NotificationService for NotificationServiceImpl {
    async fn list(&self, user_id: Uuid) -> Result<Vec<NotificationView>, NotificationError> {
        let notifications = self.notifications.list_for(user_id).await?;

        let mut actor_ids: Vec<Uuid> = notifications.iter().map(|n| n.from_user_id).collect();
        actor_ids.sort_unstable();
        actor_ids.dedup();
        let actors: HashMap<Uuid, UserSummary> = self
            .users
            .find_by_ids(&actor_ids)
            .await?
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect();

        self.notifications.mark_all_read(user_id).await?;

        if notifications.is_empty() {
            return Err(NotificationError::Empty);
        }

        Ok(notifications
            .into_iter()
            .filter_map(|n| {
                Some(NotificationView {
                    id: n.id,
                    from: actors.get(&n.from_user_id)?.clone(),
                    to: n.to_user_id,
                    kind: n.kind,
                    read: n.read,
                    created_at: n.created_at,
                })
            })
            .collect())
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<i64, NotificationError> {
        Ok(self.notifications.count_unread(user_id).await?)
    }

    async fn delete(&self, user_id: Uuid, notification_id: Uuid) -> Result<(), NotificationError> {
        let notification = self
            .notifications
            .find_by_id(notification_id)
            .await?
            .ok_or(NotificationError::NotFound)?;

        if notification.to_user_id != user_id {
            return Err(NotificationError::Forbidden);
        }

        self.notifications.delete(notification_id).await?;
        Ok(())
    }

    async fn delete_all(&self, user_id: Uuid) -> Result<u64, NotificationError> {
        match self.notifications.delete_all_for(user_id).await? {
            0 => Err(NotificationError::NothingToDelete),
            removed => Ok(removed),
        }
    }
}
