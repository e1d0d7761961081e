//! User entity and repository trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Default bio for new accounts.
pub const DEFAULT_BIO: &str = "No bio provided";

/// Default link for new accounts.
pub const DEFAULT_LINK: &str = "No link provided";

/// Represents a user account.
///
/// Maps to the `users` table:
/// - id: UUID PRIMARY KEY DEFAULT gen_random_uuid()
/// - username: VARCHAR(32) NOT NULL UNIQUE
/// - name: VARCHAR(64) NOT NULL
/// - email: VARCHAR(255) NOT NULL UNIQUE
/// - password_hash: VARCHAR(255) NOT NULL
/// - bio, link, profile_img, cover_img: TEXT NOT NULL
/// - created_at, updated_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Store-generated primary key
    pub id: Uuid,

    /// Username (unique)
    pub username: String,

    /// Full display name
    pub name: String,

    /// Email address (unique)
    pub email: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub bio: String,

    pub link: String,

    /// URL of the profile picture
    pub profile_img: String,

    /// URL of the cover picture
    pub cover_img: String,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a user. The store assigns `id` and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub profile_img: String,
    pub cover_img: String,
}

impl NewUser {
    /// Build a new user with default bio, link, and placeholder images.
    pub fn new(
        username: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        default_image_url: &str,
    ) -> Self {
        Self {
            username: username.into(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            profile_img: default_image_url.to_string(),
            cover_img: default_image_url.to_string(),
        }
    }
}

/// Repository trait for User data access operations.
///
/// Implementations of this trait handle the actual database interactions.
/// The trait is defined in the domain layer to maintain dependency inversion.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Find several users at once. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, AppError>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Find a user whose username or email matches.
    async fn find_by_login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, AppError>;

    /// Case-insensitive substring search on username.
    async fn search(&self, fragment: &str, limit: i64) -> Result<Vec<User>, AppError>;

    /// Random sample of users whose id is not in `exclude`.
    async fn sample_excluding(&self, exclude: &[Uuid], limit: i64) -> Result<Vec<User>, AppError>;

    /// Create a new user. Duplicate username or email yields `AppError::Conflict`.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    /// Persist profile fields and password hash of an existing user.
    async fn update(&self, user: &User) -> Result<User, AppError>;

    /// Delete a user together with everything that references them.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    /// Check if an email address is already registered.
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    /// Check if a username is already taken.
    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;
}
