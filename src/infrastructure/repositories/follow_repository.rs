//! Follow Repository Implementation
//!
//! PostgreSQL implementation of the FollowRepository trait over the
//! `follows` edge table.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::FollowRepository;
use crate::shared::error::AppError;

/// PostgreSQL follow graph repository.
#[derive(Clone)]
pub struct PgFollowRepository {
    pool: PgPool,
}

impl PgFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PgFollowRepository {
    async fn is_following(&self, follower: Uuid, followee: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND followee_id = $2)",
        )
        .bind(follower)
        .bind(followee)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn follow(&self, follower: Uuid, followee: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO follows (follower_id, followee_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, followee_id) DO NOTHING
            "#,
        )
        .bind(follower)
        .bind(followee)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn unfollow(&self, follower: Uuid, followee: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2")
            .bind(follower)
            .bind(followee)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn following_ids(&self, user: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar(
            "SELECT followee_id FROM follows WHERE follower_id = $1 ORDER BY created_at",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn follower_ids(&self, user: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar(
            "SELECT follower_id FROM follows WHERE followee_id = $1 ORDER BY created_at",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn followed_by_any(&self, users: &[Uuid]) -> Result<Vec<Uuid>, AppError> {
        if users.is_empty() {
            return Ok(Vec::new());
        }

        let ids = sqlx::query_scalar(
            "SELECT DISTINCT followee_id FROM follows WHERE follower_id = ANY($1::uuid[])",
        )
        .bind(users)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
