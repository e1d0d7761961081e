//! Notification Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Notification, NotificationKind, NotificationRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    from_user_id: Uuid,
    to_user_id: Uuid,
    kind: String,
    read: bool,
    created_at: DateTime<Utc>,
}

impl NotificationRow {
    fn into_notification(self) -> Result<Notification, AppError> {
        let kind = NotificationKind::from_str(&self.kind).ok_or_else(|| {
            AppError::Internal(format!("Unknown notification kind: {}", self.kind))
        })?;

        Ok(Notification {
            id: self.id,
            from_user_id: self.from_user_id,
            to_user_id: self.to_user_id,
            kind,
            read: self.read,
            created_at: self.created_at,
        })
    }
}

/// PostgreSQL notification repository implementation.
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create(
        &self,
        from: Uuid,
        to: Uuid,
        kind: NotificationKind,
    ) -> Result<Notification, AppError> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notifications (from_user_id, to_user_id, kind)
            VALUES ($1, $2, $3)
            RETURNING id, from_user_id, to_user_id, kind, read, created_at
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(kind.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.into_notification()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>, AppError> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, from_user_id, to_user_id, kind, read, created_at
            FROM notifications
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_notification()).transpose()
    }

    async fn list_for(&self, recipient: Uuid) -> Result<Vec<Notification>, AppError> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, from_user_id, to_user_id, kind, read, created_at
            FROM notifications
            WHERE to_user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(recipient)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_notification()).collect()
    }

    async fn mark_all_read(&self, recipient: Uuid) -> Result<u64, AppError> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE to_user_id = $1 AND NOT read")
                .bind(recipient)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    async fn count_unread(&self, recipient: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE to_user_id = $1 AND NOT read",
        )
        .bind(recipient)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_all_for(&self, recipient: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM notifications WHERE to_user_id = $1")
            .bind(recipient)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
