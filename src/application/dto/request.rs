//! Request DTOs
//!
//! Data structures for API request bodies. Field names are camelCase on
//! the wire. Required text fields default to empty so a missing key and a
//! blank value fail validation the same way.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::domain::ImageInput;
use crate::shared::validation::{validate_not_blank, validate_password_strength};

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[serde(default)]
    #[validate(
        custom(function = "validate_not_blank", message = "Please provide all the fields"),
        length(max = 32, message = "Username must be at most 32 characters")
    )]
    pub username: String,

    #[serde(default)]
    #[validate(
        custom(function = "validate_not_blank", message = "Please provide all the fields"),
        length(max = 64, message = "Name must be at most 64 characters")
    )]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email"))]
    pub email: String,

    #[serde(default)]
    #[validate(
        length(min = 8, message = "Password must be at least 8 characters long"),
        custom(function = "validate_password_strength")
    )]
    pub password: String,
}

/// Login request: either username or email identifies the account.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    pub username: Option<String>,

    pub email: Option<String>,

    #[serde(default)]
    pub password: String,
}

/// Partial profile update
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(
        custom(function = "validate_not_blank", message = "Name must not be empty"),
        length(max = 64, message = "Name must be at most 64 characters")
    )]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,

    #[validate(length(max = 300, message = "Bio must be at most 300 characters"))]
    pub bio: Option<String>,

    #[validate(length(max = 300, message = "Link must be at most 300 characters"))]
    pub link: Option<String>,

    #[serde(default)]
    pub profile_img: ImageInput,

    #[serde(default)]
    pub cover_img: ImageInput,

    pub current_password: Option<String>,

    pub new_password: Option<String>,
}

/// Create post request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Please provide all the fields"))]
    pub title: String,

    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Please provide all the fields"))]
    pub description: String,

    #[serde(default)]
    pub image: ImageInput,
}

/// Edit post request. Blank title or description keeps the stored value.
#[derive(Debug, Default, Deserialize)]
pub struct EditPostRequest {
    pub title: Option<String>,

    pub description: Option<String>,

    #[serde(default)]
    pub image: ImageInput,
}

/// Comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Please provide comment"))]
    pub text: String,
}

/// Send direct message request. The length limit applies to the trimmed
/// content and is checked by the message service.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub receiver_id: Uuid,

    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Invalid message data"))]
    pub content: String,
}
