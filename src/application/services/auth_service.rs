//! Authentication Service
//!
//! Handles signup, login, password hashing, and session token issue and
//! verification. Tokens are HS256 JWTs whose subject is the user id.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::dto::request::SignupRequest;
use crate::application::dto::response::UserProfile;
use crate::application::services::user_service::load_profile;
use crate::config::JwtSettings;
use crate::domain::{FollowRepository, NewUser, User, UserRepository};
use crate::shared::error::AppError;

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new account and open a session for it.
    async fn signup(&self, request: SignupRequest) -> Result<(UserProfile, String), AuthError>;

    /// Authenticate by username or email and open a session.
    async fn login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        password: &str,
    ) -> Result<(UserProfile, String), AuthError>;

    /// Resolve a session token to an existing user.
    async fn authenticate(&self, token: Option<&str>) -> Result<User, AuthError>;

    /// Profile of the signed-in user.
    async fn current_profile(&self, user_id: Uuid) -> Result<UserProfile, AuthError>;

    /// Session lifetime in days.
    fn session_days(&self) -> i64;
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Session expired, login again")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("User not found")]
    SessionUserGone,

    #[error("User not found")]
    UserNotFound,

    #[error("Please provide username or email")]
    MissingIdentifier,

    #[error("Please provide password")]
    MissingPassword,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username already exists")]
    UsernameExists,

    #[error("Email already exists")]
    EmailExists,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::SessionUserGone => {
                AppError::Unauthorized(err.to_string())
            }
            AuthError::UserNotFound => AppError::NotFound(err.to_string()),
            AuthError::MissingIdentifier
            | AuthError::MissingPassword
            | AuthError::InvalidCredentials => AppError::BadRequest(err.to_string()),
            AuthError::UsernameExists | AuthError::EmailExists => {
                AppError::Conflict(err.to_string())
            }
            AuthError::Internal(msg) => AppError::Internal(msg),
            AuthError::Store(e) => e,
        }
    }
}

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// AuthService implementation
pub struct AuthServiceImpl {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
    jwt_settings: JwtSettings,
    default_image_url: String,
}

impl AuthServiceImpl {
    /// Create a new AuthServiceImpl
    pub fn new(
        users: Arc<dyn UserRepository>,
        follows: Arc<dyn FollowRepository>,
        jwt_settings: JwtSettings,
        default_image_url: impl Into<String>,
    ) -> Self {
        Self {
            users,
            follows,
            jwt_settings,
            default_image_url: default_image_url.into(),
        }
    }

    /// Issue a session token for `user_id`.
    fn issue_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        let expiry = now + Duration::days(self.jwt_settings.expiry_days);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiry.timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_settings.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Decode and validate a session token. Expired and malformed tokens
    /// are both reported as `InvalidToken`.
    fn decode_token(&self, token: &str) -> Result<Uuid, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_settings.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AuthError::InvalidToken)?;

        token_data
            .claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| AuthError::InvalidToken)
    }

    async fn open_session(&self, user: User) -> Result<(UserProfile, String), AuthError> {
        let token = self.issue_token(user.id)?;
        let profile = load_profile(self.follows.as_ref(), user).await?;
        Ok((profile, token))
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn signup(&self, request: SignupRequest) -> Result<(UserProfile, String), AuthError> {
        let username = request.username.trim();
        let email = request.email.trim();

        if self.users.username_exists(username).await? {
            return Err(AuthError::UsernameExists);
        }

        if self.users.email_exists(email).await? {
            return Err(AuthError::EmailExists);
        }

        let password_hash = hash_password(&request.password)?;

        let user = self
            .users
            .create(NewUser::new(
                username,
                request.name.trim(),
                email,
                password_hash,
                &self.default_image_url,
            ))
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User signed up");

        self.open_session(user).await
    }

    async fn login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        password: &str,
    ) -> Result<(UserProfile, String), AuthError> {
        let username = username.map(str::trim).filter(|s| !s.is_empty());
        let email = email.map(str::trim).filter(|s| !s.is_empty());
        if username.is_none() && email.is_none() {
            return Err(AuthError::MissingIdentifier);
        }

        let user = self
            .users
            .find_by_login(username, email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if password.is_empty() {
            return Err(AuthError::MissingPassword);
        }

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::debug!(user_id = %user.id, "User logged in");

        self.open_session(user).await
    }

    async fn authenticate(&self, token: Option<&str>) -> Result<User, AuthError> {
        let token = token.filter(|t| !t.is_empty()).ok_or(AuthError::MissingToken)?;
        let user_id = self.decode_token(token)?;

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::SessionUserGone)
    }

    async fn current_profile(&self, user_id: Uuid) -> Result<UserProfile, AuthError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(load_profile(self.follows.as_ref(), user).await?)
    }

    fn session_days(&self) -> i64 {
        self.jwt_settings.expiry_days
    }
}
