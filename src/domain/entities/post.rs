//! Post entity, comments, likes, and repository trait.
//!
//! Maps to the `posts`, `post_likes` and `post_comments` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents a post authored by exactly one user.
///
/// Maps to the `posts` table:
/// - id: UUID PRIMARY KEY DEFAULT gen_random_uuid()
/// - author_id: UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// - title: TEXT NOT NULL
/// - description: TEXT NOT NULL
/// - image: TEXT (hosted image URL)
/// - created_at, updated_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,

    /// Owner of the post
    pub author_id: Uuid,

    pub title: String,

    pub description: String,

    /// Hosted image URL, if any
    pub image: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Check if the given user owns this post.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

/// Fields supplied when creating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
}

/// A comment appended to a post. Comments are never edited.
///
/// Maps to the `post_comments` table:
/// - id: UUID PRIMARY KEY DEFAULT gen_random_uuid()
/// - post_id: UUID NOT NULL REFERENCES posts(id) ON DELETE CASCADE
/// - author_id: UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// - text: TEXT NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when appending a comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
}

/// One row of the `post_likes` edge table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostLike {
    pub post_id: Uuid,
    pub user_id: Uuid,
}

/// Which posts a listing query selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
    /// Every post
    All,
    /// Posts written by one user
    ByAuthor(Uuid),
    /// Posts written by any of the given users
    ByAuthors(Vec<Uuid>),
    /// Posts the given user has liked
    LikedBy(Uuid),
}

/// Repository trait for Post data access operations.
///
/// Listings are ordered newest first by `(created_at, id)`.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post.
    async fn create(&self, post: NewPost) -> Result<Post, AppError>;

    /// Find a post by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, AppError>;

    /// Persist title, description and image of an existing post.
    async fn update(&self, post: &Post) -> Result<Post, AppError>;

    /// Delete a post with its likes and comments.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    /// List posts matching a filter, newest first.
    async fn list(&self, filter: PostFilter) -> Result<Vec<Post>, AppError>;

    /// Whether `user_id` currently likes the post.
    async fn is_liked(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, AppError>;

    /// Record a like. Returns false when the like already existed.
    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, AppError>;

    /// Remove a like. Returns false when there was none.
    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, AppError>;

    /// Like edges of the given posts.
    async fn likes_for(&self, post_ids: &[Uuid]) -> Result<Vec<PostLike>, AppError>;

    /// Append a comment.
    async fn add_comment(&self, comment: NewComment) -> Result<Comment, AppError>;

    /// Comments of the given posts, oldest first.
    async fn comments_for(&self, post_ids: &[Uuid]) -> Result<Vec<Comment>, AppError>;
}
