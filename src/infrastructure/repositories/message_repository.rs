//! Message Repository Implementation
//!
//! PostgreSQL implementation of direct message storage: history windows,
//! read receipts, soft deletion and the per-peer inbox summary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{DirectMessage, MessageRepository, NewMessage};
use crate::shared::error::AppError;

/// PostgreSQL message repository implementation.
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Creates a new PgMessageRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    sender_id: Uuid,
    receiver_id: Uuid,
    content: String,
    read: bool,
    deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_message(self) -> DirectMessage {
        DirectMessage {
            id: self.id,
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            content: self.content,
            read: self.read,
            deleted: self.deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UnreadCountRow {
    sender_id: Uuid,
    count: i64,
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn create(&self, message: NewMessage) -> Result<DirectMessage, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (sender_id, receiver_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, sender_id, receiver_id, content, read, deleted, created_at, updated_at
            "#,
        )
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(&message.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_message())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<DirectMessage>, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, sender_id, receiver_id, content, read, deleted, created_at, updated_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_message()))
    }

    async fn list_between(
        &self,
        user_a: Uuid,
        user_b: Uuid,
        limit: i64,
    ) -> Result<Vec<DirectMessage>, AppError> {
        // Take the newest window, then flip it to chronological order
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, sender_id, receiver_id, content, read, deleted, created_at, updated_at
            FROM (
                SELECT id, sender_id, receiver_id, content, read, deleted, created_at, updated_at
                FROM messages
                WHERE NOT deleted
                  AND ((sender_id = $1 AND receiver_id = $2)
                    OR (sender_id = $2 AND receiver_id = $1))
                ORDER BY created_at DESC, id DESC
                LIMIT $3
            ) recent
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_message()).collect())
    }

    async fn mark_read(&self, sender: Uuid, receiver: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET read = TRUE, updated_at = NOW()
            WHERE sender_id = $1 AND receiver_id = $2 AND NOT read
            "#,
        )
        .bind(sender)
        .bind(receiver)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn soft_delete(&self, id: Uuid, sender: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET deleted = TRUE, updated_at = NOW()
            WHERE id = $1 AND sender_id = $2
            "#,
        )
        .bind(id)
        .bind(sender)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn latest_per_peer(&self, user: Uuid) -> Result<Vec<DirectMessage>, AppError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, sender_id, receiver_id, content, read, deleted, created_at, updated_at
            FROM (
                SELECT DISTINCT ON (CASE WHEN sender_id = $1 THEN receiver_id ELSE sender_id END)
                       id, sender_id, receiver_id, content, read, deleted, created_at, updated_at
                FROM messages
                WHERE NOT deleted AND (sender_id = $1 OR receiver_id = $1)
                ORDER BY CASE WHEN sender_id = $1 THEN receiver_id ELSE sender_id END,
                         created_at DESC, id DESC
            ) latest
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_message()).collect())
    }

    async fn unread_counts_by_sender(&self, user: Uuid) -> Result<Vec<(Uuid, i64)>, AppError> {
        let rows = sqlx::query_as::<_, UnreadCountRow>(
            r#"
            SELECT sender_id, COUNT(*) AS count
            FROM messages
            WHERE receiver_id = $1 AND NOT read AND NOT deleted
            GROUP BY sender_id
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| (r.sender_id, r.count)).collect())
    }

    async fn partner_ids(&self, user: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar(
            r#"
            SELECT DISTINCT CASE WHEN sender_id = $1 THEN receiver_id ELSE sender_id END
            FROM messages
            WHERE (sender_id = $1 OR receiver_id = $1)
              AND sender_id <> receiver_id
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn count_unread(&self, user: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE receiver_id = $1 AND NOT read AND NOT deleted",
        )
        .bind(user)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
