//! Follow graph edges and repository trait.
//!
//! Maps to the `follows` edge table:
//! - follower_id: UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE
//! - followee_id: UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE
//! - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! - PRIMARY KEY (follower_id, followee_id)

use async_trait::async_trait;
use uuid::Uuid;

use crate::shared::error::AppError;

/// Repository trait for the follow graph.
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Whether `follower` currently follows `followee`.
    async fn is_following(&self, follower: Uuid, followee: Uuid) -> Result<bool, AppError>;

    /// Add an edge. Returns false when it already existed.
    async fn follow(&self, follower: Uuid, followee: Uuid) -> Result<bool, AppError>;

    /// Remove an edge. Returns false when there was none.
    async fn unfollow(&self, follower: Uuid, followee: Uuid) -> Result<bool, AppError>;

    /// Ids of the users `user` follows.
    async fn following_ids(&self, user: Uuid) -> Result<Vec<Uuid>, AppError>;

    /// Ids of the users following `user`.
    async fn follower_ids(&self, user: Uuid) -> Result<Vec<Uuid>, AppError>;

    /// Distinct ids followed by any of `users`.
    async fn followed_by_any(&self, users: &[Uuid]) -> Result<Vec<Uuid>, AppError>;
}
