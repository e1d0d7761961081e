//! Post Repository Implementation
//!
//! PostgreSQL implementation of the PostRepository trait covering the
//! `posts`, `post_likes` and `post_comments` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Comment, NewComment, NewPost, Post, PostFilter, PostLike, PostRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    author_id: Uuid,
    title: String,
    description: String,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PostRow {
    fn into_post(self) -> Post {
        Post {
            id: self.id,
            author_id: self.author_id,
            title: self.title,
            description: self.description,
            image: self.image,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    author_id: Uuid,
    text: String,
    created_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_comment(self) -> Comment {
        Comment {
            id: self.id,
            post_id: self.post_id,
            author_id: self.author_id,
            text: self.text,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LikeRow {
    post_id: Uuid,
    user_id: Uuid,
}

/// PostgreSQL post repository implementation.
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, AppError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (author_id, title, description, image)
            VALUES ($1, $2, $3, $4)
            RETURNING id, author_id, title, description, image, created_at, updated_at
            "#,
        )
        .bind(post.author_id)
        .bind(&post.title)
        .bind(&post.description)
        .bind(&post.image)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_post())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, AppError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_id, title, description, image, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_post()))
    }

    async fn update(&self, post: &Post) -> Result<Post, AppError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET title = $2, description = $3, image = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, author_id, title, description, image, created_at, updated_at
            "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.description)
        .bind(&post.image)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

        Ok(row.into_post())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list(&self, filter: PostFilter) -> Result<Vec<Post>, AppError> {
        let rows = match filter {
            PostFilter::All => {
                sqlx::query_as::<_, PostRow>(
                    r#"
                    SELECT id, author_id, title, description, image, created_at, updated_at
                    FROM posts
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
            PostFilter::ByAuthor(author) => {
                sqlx::query_as::<_, PostRow>(
                    r#"
                    SELECT id, author_id, title, description, image, created_at, updated_at
                    FROM posts
                    WHERE author_id = $1
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .bind(author)
                .fetch_all(&self.pool)
                .await?
            }
            PostFilter::ByAuthors(authors) => {
                if authors.is_empty() {
                    return Ok(Vec::new());
                }
                sqlx::query_as::<_, PostRow>(
                    r#"
                    SELECT id, author_id, title, description, image, created_at, updated_at
                    FROM posts
                    WHERE author_id = ANY($1::uuid[])
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .bind(authors)
                .fetch_all(&self.pool)
                .await?
            }
            PostFilter::LikedBy(user) => {
                sqlx::query_as::<_, PostRow>(
                    r#"
                    SELECT p.id, p.author_id, p.title, p.description, p.image,
                           p.created_at, p.updated_at
                    FROM posts p
                    JOIN post_likes l ON l.post_id = p.id
                    WHERE l.user_id = $1
                    ORDER BY p.created_at DESC, p.id DESC
                    "#,
                )
                .bind(user)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(|r| r.into_post()).collect())
    }

    async fn is_liked(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM post_likes WHERE post_id = $1 AND user_id = $2)",
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO post_likes (post_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (post_id, user_id) DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn likes_for(&self, post_ids: &[Uuid]) -> Result<Vec<PostLike>, AppError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, LikeRow>(
            r#"
            SELECT post_id, user_id
            FROM post_likes
            WHERE post_id = ANY($1::uuid[])
            ORDER BY created_at
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| PostLike {
                post_id: r.post_id,
                user_id: r.user_id,
            })
            .collect())
    }

    async fn add_comment(&self, comment: NewComment) -> Result<Comment, AppError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO post_comments (post_id, author_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, author_id, text, created_at
            "#,
        )
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_comment())
    }

    async fn comments_for(&self, post_ids: &[Uuid]) -> Result<Vec<Comment>, AppError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, post_id, author_id, text, created_at
            FROM post_comments
            WHERE post_id = ANY($1::uuid[])
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_comment()).collect())
    }
}
