//! User Service
//!
//! Profile search, follow graph, suggestions, profile updates, and account
//! deletion.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::application::dto::request::UpdateProfileRequest;
use crate::application::dto::response::{FollowResponse, UserProfile};
use crate::application::images::{ImageError, ImageStore};
use crate::application::services::auth_service::{hash_password, verify_password, AuthError};
use crate::domain::{
    FollowRepository, ImageFolder, ImageInput, NotificationKind, NotificationRepository,
    PostFilter, PostRepository, User, UserRepository,
};
use crate::shared::error::AppError;

/// Shortest fragment the username search responds to.
pub const MIN_SEARCH_LENGTH: usize = 3;

/// Most profiles returned by the username search.
pub const SEARCH_LIMIT: i64 = 5;

/// Suggestions drawn from people followed by the caller's followees.
pub const SUGGESTED_MUTUAL: usize = 4;

/// Suggestions drawn from everyone else.
pub const SUGGESTED_RANDOM: i64 = 2;

/// Shortest accepted new password on profile update.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// User service trait for dependency injection
#[async_trait]
pub trait UserService: Send + Sync {
    /// Case-insensitive username search.
    async fn search(&self, fragment: &str) -> Result<Vec<UserProfile>, UserError>;

    /// Users the caller may want to follow.
    async fn suggested(&self, user_id: Uuid) -> Result<Vec<UserProfile>, UserError>;

    /// Profiles of the users the caller follows.
    async fn following(&self, user_id: Uuid) -> Result<Vec<UserProfile>, UserError>;

    /// Follow `target`, or unfollow when already following.
    async fn toggle_follow(&self, user_id: Uuid, target: Uuid) -> Result<FollowResponse, UserError>;

    /// Apply a partial profile update.
    async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<UserProfile, UserError>;

    /// Delete the account and everything that references it.
    async fn delete_account(&self, user_id: Uuid) -> Result<(), UserError>;
}

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("You can't follow or unfollow yourself")]
    SelfFollow,

    #[error("Both current password and new password are required")]
    PasswordPairRequired,

    #[error("Current password entered is incorrect")]
    IncorrectPassword,

    #[error("New password must be at least 8 characters long")]
    NewPasswordTooShort,

    #[error("Email already exists")]
    EmailExists,

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound => AppError::NotFound(err.to_string()),
            UserError::SelfFollow
            | UserError::PasswordPairRequired
            | UserError::IncorrectPassword
            | UserError::NewPasswordTooShort => AppError::BadRequest(err.to_string()),
            UserError::EmailExists => AppError::Conflict(err.to_string()),
            UserError::Image(e) => e.into(),
            UserError::Auth(e) => e.into(),
            UserError::Store(e) => e,
        }
    }
}

/// Attach follower and following ids to a user.
pub async fn load_profile(
    follows: &dyn FollowRepository,
    user: User,
) -> Result<UserProfile, AppError> {
    let followers = follows.follower_ids(user.id).await?;
    let following = follows.following_ids(user.id).await?;
    Ok(UserProfile::new(user, followers, following))
}

/// UserService implementation
pub struct UserServiceImpl {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
    posts: Arc<dyn PostRepository>,
    notifications: Arc<dyn NotificationRepository>,
    images: ImageStore,
}

impl UserServiceImpl {
    /// Create a new UserServiceImpl
    pub fn new(
        users: Arc<dyn UserRepository>,
        follows: Arc<dyn FollowRepository>,
        posts: Arc<dyn PostRepository>,
        notifications: Arc<dyn NotificationRepository>,
        images: ImageStore,
    ) -> Self {
        Self {
            users,
            follows,
            posts,
            notifications,
            images,
        }
    }

    async fn profiles(&self, users: Vec<User>) -> Result<Vec<UserProfile>, UserError> {
        let mut profiles = Vec::with_capacity(users.len());
        for user in users {
            profiles.push(load_profile(self.follows.as_ref(), user).await?);
        }
        Ok(profiles)
    }

    /// Resolve the requested change of a profile or cover image.
    /// Returns the URL to store and the hosted URL that became unused.
    async fn apply_image(
        &self,
        input: &ImageInput,
        current: &str,
        folder: ImageFolder,
    ) -> Result<(String, Option<String>), UserError> {
        match input {
            ImageInput::Keep => Ok((current.to_string(), None)),
            ImageInput::Clear => Ok((
                self.images.default_url().to_string(),
                Some(current.to_string()),
            )),
            ImageInput::Set(_) => match input.replacement_for(Some(current)) {
                Some(source) => {
                    let hosted = self.images.upload(source, folder).await?;
                    Ok((hosted, Some(current.to_string())))
                }
                None => Ok((current.to_string(), None)),
            },
        }
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn search(&self, fragment: &str) -> Result<Vec<UserProfile>, UserError> {
        let fragment = fragment.trim();
        if fragment.chars().count() < MIN_SEARCH_LENGTH {
            return Ok(Vec::new());
        }

        let users = self.users.search(fragment, SEARCH_LIMIT).await?;
        self.profiles(users).await
    }

    async fn suggested(&self, user_id: Uuid) -> Result<Vec<UserProfile>, UserError> {
        let following = self.follows.following_ids(user_id).await?;
        let already: HashSet<Uuid> = following.iter().copied().chain([user_id]).collect();

        let mut mutual: Vec<Uuid> = self
            .follows
            .followed_by_any(&following)
            .await?
            .into_iter()
            .filter(|id| !already.contains(id))
            .collect();
        mutual.shuffle(&mut rand::rng());
        mutual.truncate(SUGGESTED_MUTUAL);

        let mut picked = self.users.find_by_ids(&mutual).await?;

        let exclude: Vec<Uuid> = already.iter().copied().chain(mutual).collect();
        picked.extend(
            self.users
                .sample_excluding(&exclude, SUGGESTED_RANDOM)
                .await?,
        );

        self.profiles(picked).await
    }

    async fn following(&self, user_id: Uuid) -> Result<Vec<UserProfile>, UserError> {
        let ids = self.follows.following_ids(user_id).await?;
        let users = self.users.find_by_ids(&ids).await?;
        self.profiles(users).await
    }

    async fn toggle_follow(&self, user_id: Uuid, target: Uuid) -> Result<FollowResponse, UserError> {
        if user_id == target {
            return Err(UserError::SelfFollow);
        }

        self.users
            .find_by_id(target)
            .await?
            .ok_or(UserError::NotFound)?;

        if self.follows.is_following(user_id, target).await? {
            self.follows.unfollow(user_id, target).await?;
            tracing::debug!(%user_id, %target, "Unfollowed");
            return Ok(FollowResponse {
                message: "Unfollowed successfully".into(),
                following: false,
            });
        }

        if self.follows.follow(user_id, target).await? {
            self.notifications
                .create(user_id, target, NotificationKind::Follow)
                .await?;
        }
        tracing::debug!(%user_id, %target, "Followed");

        Ok(FollowResponse {
            message: "Followed successfully".into(),
            following: true,
        })
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<UserProfile, UserError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound)?;

        let current_password = request.current_password.as_deref().filter(|p| !p.is_empty());
        let new_password = request.new_password.as_deref().filter(|p| !p.is_empty());
        match (current_password, new_password) {
            (None, None) => {}
            (Some(current), Some(new)) => {
                if !verify_password(current, &user.password_hash)? {
                    return Err(UserError::IncorrectPassword);
                }
                if new.chars().count() < MIN_PASSWORD_LENGTH {
                    return Err(UserError::NewPasswordTooShort);
                }
                user.password_hash = hash_password(new)?;
            }
            _ => return Err(UserError::PasswordPairRequired),
        }

        if let Some(email) = request.email.as_deref().map(str::trim) {
            if email != user.email {
                if self.users.email_exists(email).await? {
                    return Err(UserError::EmailExists);
                }
                user.email = email.to_string();
            }
        }
        if let Some(name) = request.name {
            user.name = name.trim().to_string();
        }
        if let Some(bio) = request.bio {
            user.bio = bio;
        }
        if let Some(link) = request.link {
            user.link = link;
        }

        let (profile_img, old_profile) = self
            .apply_image(&request.profile_img, &user.profile_img, ImageFolder::Profile)
            .await?;
        let (cover_img, old_cover) = match self
            .apply_image(&request.cover_img, &user.cover_img, ImageFolder::Cover)
            .await
        {
            Ok(applied) => applied,
            Err(e) => {
                if old_profile.is_some() {
                    self.images.discard(&profile_img).await;
                }
                return Err(e);
            }
        };

        // Images hosted by this request; the placeholder is never destroyed
        let fresh: Vec<String> = [(&profile_img, &old_profile), (&cover_img, &old_cover)]
            .into_iter()
            .filter(|(_, old)| old.is_some())
            .map(|(new, _)| new.clone())
            .collect();
        user.profile_img = profile_img;
        user.cover_img = cover_img;

        let user = match self.users.update(&user).await {
            Ok(user) => user,
            Err(e) => {
                for url in &fresh {
                    self.images.discard(url).await;
                }
                return Err(e.into());
            }
        };

        for url in [old_profile, old_cover].into_iter().flatten() {
            self.images.discard(&url).await;
        }

        Ok(load_profile(self.follows.as_ref(), user).await?)
    }

    async fn delete_account(&self, user_id: Uuid) -> Result<(), UserError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound)?;

        let post_images: Vec<String> = self
            .posts
            .list(PostFilter::ByAuthor(user_id))
            .await?
            .into_iter()
            .filter_map(|post| post.image)
            .collect();

        self.users.delete(user_id).await?;
        tracing::info!(%user_id, username = %user.username, "Account deleted");

        for url in [user.profile_img, user.cover_img]
            .into_iter()
            .chain(post_images)
        {
            self.images.discard(&url).await;
        }

        Ok(())
    }
}
