//! Post Service
//!
//! Post authoring, likes, comments, and the filtered listings. Listings
//! are populated with author summaries, liker ids and comments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::dto::request::{CreatePostRequest, EditPostRequest};
use crate::application::dto::response::{CommentView, LikeResponse, PostView, UserSummary};
use crate::application::images::{ImageError, ImageStore};
use crate::domain::{
    FollowRepository, ImageFolder, ImageInput, NewComment, NewPost, NotificationKind,
    NotificationRepository, Post, PostFilter, PostRepository, UserRepository,
};
use crate::shared::error::AppError;

/// Post service trait for dependency injection
#[async_trait]
pub trait PostService: Send + Sync {
    /// Create a post owned by `user_id`.
    async fn create(&self, user_id: Uuid, request: CreatePostRequest) -> Result<PostView, PostError>;

    /// Edit a post. Only the owner may.
    async fn edit(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        request: EditPostRequest,
    ) -> Result<PostView, PostError>;

    /// Delete a post. Only the owner may.
    async fn delete(&self, user_id: Uuid, post_id: Uuid) -> Result<(), PostError>;

    /// Like the post, or unlike it when already liked.
    async fn toggle_like(&self, user_id: Uuid, post_id: Uuid) -> Result<LikeResponse, PostError>;

    /// Append a comment.
    async fn comment(&self, user_id: Uuid, post_id: Uuid, text: &str) -> Result<PostView, PostError>;

    /// Every post, newest first.
    async fn all(&self) -> Result<Vec<PostView>, PostError>;

    /// Posts liked by `target`. Only visible to `target` themselves.
    async fn liked(&self, user_id: Uuid, target: Uuid) -> Result<Vec<PostView>, PostError>;

    /// Posts written by the users `user_id` follows.
    async fn following(&self, user_id: Uuid) -> Result<Vec<PostView>, PostError>;

    /// Posts written by `username`.
    async fn by_username(&self, username: &str) -> Result<Vec<PostView>, PostError>;
}

/// Post service errors
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("Post not found")]
    NotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("No posts found")]
    NoPosts,

    #[error("You are not authorized to edit this post")]
    EditForbidden,

    #[error("You are not authorized to delete this post")]
    DeleteForbidden,

    #[error("You are not authorized to view this page")]
    LikedForbidden,

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<PostError> for AppError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::NotFound | PostError::UserNotFound | PostError::NoPosts => {
                AppError::NotFound(err.to_string())
            }
            PostError::EditForbidden | PostError::DeleteForbidden | PostError::LikedForbidden => {
                AppError::Forbidden(err.to_string())
            }
            PostError::Image(e) => e.into(),
            PostError::Store(e) => e,
        }
    }
}

/// PostService implementation
pub struct PostServiceImpl {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
    notifications: Arc<dyn NotificationRepository>,
    images: ImageStore,
}

impl PostServiceImpl {
    /// Create a new PostServiceImpl
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        follows: Arc<dyn FollowRepository>,
        notifications: Arc<dyn NotificationRepository>,
        images: ImageStore,
    ) -> Self {
        Self {
            posts,
            users,
            follows,
            notifications,
            images,
        }
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Post, PostError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or(PostError::NotFound)
    }

    /// Attach authors, likers and comments to posts, preserving order.
    async fn populate(&self, posts: Vec<Post>) -> Result<Vec<PostView>, PostError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let likes = self.posts.likes_for(&post_ids).await?;
        let comments = self.posts.comments_for(&post_ids).await?;

        let mut user_ids: Vec<Uuid> = posts
            .iter()
            .map(|p| p.author_id)
            .chain(comments.iter().map(|c| c.author_id))
            .collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let summaries: HashMap<Uuid, UserSummary> = self
            .users
            .find_by_ids(&user_ids)
            .await?
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect();

        let mut likers: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for like in likes {
            likers.entry(like.post_id).or_default().push(like.user_id);
        }

        let mut threads: HashMap<Uuid, Vec<CommentView>> = HashMap::new();
        for comment in comments {
            let Some(author) = summaries.get(&comment.author_id) else {
                continue;
            };
            threads.entry(comment.post_id).or_default().push(CommentView {
                id: comment.id,
                user: author.clone(),
                text: comment.text,
                created_at: comment.created_at,
            });
        }

        Ok(posts
            .into_iter()
            .filter_map(|post| {
                let user = summaries.get(&post.author_id)?.clone();
                Some(PostView {
                    id: post.id,
                    user,
                    likes: likers.remove(&post.id).unwrap_or_default(),
                    comments: threads.remove(&post.id).unwrap_or_default(),
                    title: post.title,
                    description: post.description,
                    image: post.image,
                    created_at: post.created_at,
                    updated_at: post.updated_at,
                })
            })
            .collect())
    }

    async fn populate_one(&self, post: Post) -> Result<PostView, PostError> {
        self.populate(vec![post])
            .await?
            .pop()
            .ok_or(PostError::UserNotFound)
    }

    async fn listing(&self, filter: PostFilter) -> Result<Vec<PostView>, PostError> {
        let posts = self.posts.list(filter).await?;
        if posts.is_empty() {
            return Err(PostError::NoPosts);
        }
        self.populate(posts).await
    }
}

#[async_trait]
impl PostService for PostServiceImpl {
    async fn create(&self, user_id: Uuid, request: CreatePostRequest) -> Result<PostView, PostError> {
        let image = match &request.image {
            ImageInput::Set(source) => Some(self.images.upload(source, ImageFolder::Post).await?),
            ImageInput::Keep | ImageInput::Clear => None,
        };

        let post = self
            .posts
            .create(NewPost {
                author_id: user_id,
                title: request.title.trim().to_string(),
                description: request.description.trim().to_string(),
                image,
            })
            .await?;

        tracing::debug!(post_id = %post.id, %user_id, "Post created");

        self.populate_one(post).await
    }

    async fn edit(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        request: EditPostRequest,
    ) -> Result<PostView, PostError> {
        let mut post = self.find_post(post_id).await?;
        if !post.is_owned_by(user_id) {
            return Err(PostError::EditForbidden);
        }

        let mut unused_image = None;
        match &request.image {
            ImageInput::Keep => {}
            ImageInput::Clear => unused_image = post.image.take(),
            ImageInput::Set(_) => {
                if let Some(source) = request.image.replacement_for(post.image.as_deref()) {
                    let hosted = self.images.upload(source, ImageFolder::Post).await?;
                    unused_image = post.image.replace(hosted);
                }
            }
        }

        if let Some(title) = request.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            post.title = title.to_string();
        }
        if let Some(description) = request
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
        {
            post.description = description.to_string();
        }

        let post = self.posts.update(&post).await?;

        if let Some(url) = unused_image {
            self.images.discard(&url).await;
        }

        self.populate_one(post).await
    }

    async fn delete(&self, user_id: Uuid, post_id: Uuid) -> Result<(), PostError> {
        let post = self.find_post(post_id).await?;
        if !post.is_owned_by(user_id) {
            return Err(PostError::DeleteForbidden);
        }

        self.posts.delete(post_id).await?;
        tracing::debug!(%post_id, %user_id, "Post deleted");

        if let Some(url) = post.image {
            self.images.discard(&url).await;
        }
        Ok(())
    }

    async fn toggle_like(&self, user_id: Uuid, post_id: Uuid) -> Result<LikeResponse, PostError> {
        let post = self.find_post(post_id).await?;

        if self.posts.is_liked(post_id, user_id).await? {
            self.posts.remove_like(post_id, user_id).await?;
            return Ok(LikeResponse {
                message: "Unliked successfully".into(),
                liked: false,
            });
        }

        let inserted = self.posts.add_like(post_id, user_id).await?;
        if inserted && !post.is_owned_by(user_id) {
            self.notifications
                .create(user_id, post.author_id, NotificationKind::Like)
                .await?;
        }

        Ok(LikeResponse {
            message: "Liked successfully".into(),
            liked: true,
        })
    }

    async fn comment(&self, user_id: Uuid, post_id: Uuid, text: &str) -> Result<PostView, PostError> {
        let post = self.find_post(post_id).await?;

        self.posts
            .add_comment(NewComment {
                post_id,
                author_id: user_id,
                text: text.trim().to_string(),
            })
            .await?;

        self.populate_one(post).await
    }

    async fn all(&self) -> Result<Vec<PostView>, PostError> {
        self.listing(PostFilter::All).await
    }

    async fn liked(&self, user_id: Uuid, target: Uuid) -> Result<Vec<PostView>, PostError> {
        self.users
            .find_by_id(target)
            .await?
            .ok_or(PostError::UserNotFound)?;

        if target != user_id {
            return Err(PostError::LikedForbidden);
        }

        self.listing(PostFilter::LikedBy(target)).await
    }

    async fn following(&self, user_id: Uuid) -> Result<Vec<PostView>, PostError> {
        let following = self.follows.following_ids(user_id).await?;
        if following.is_empty() {
            return Ok(Vec::new());
        }

        self.listing(PostFilter::ByAuthors(following)).await
    }

    async fn by_username(&self, username: &str) -> Result<Vec<PostView>, PostError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(PostError::UserNotFound)?;

        self.listing(PostFilter::ByAuthor(user.id)).await
    }
}
