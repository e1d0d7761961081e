//! Response DTOs
//!
//! Data structures for API response bodies. Field names are camelCase on
//! the wire and timestamps are RFC 3339.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DirectMessage, NotificationKind, User};

/// Plain `{message}` acknowledgement
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: String,
}

impl StatusResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Display fields of a user embedded in other records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub profile_img: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            profile_img: user.profile_img.clone(),
        }
    }
}

/// Full profile with the follow graph around the user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub email: String,
    pub bio: String,
    pub link: String,
    pub profile_img: String,
    pub cover_img: String,
    pub followers: Vec<Uuid>,
    pub following: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user: User, followers: Vec<Uuid>, following: Vec<Uuid>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            email: user.email,
            bio: user.bio,
            link: user.link,
            profile_img: user.profile_img,
            cover_img: user.cover_img,
            followers,
            following,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Toggle result of a follow request
#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub message: String,
    pub following: bool,
}

/// A comment with its author
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub user: UserSummary,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A post with its author, liker ids and comments
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub user: UserSummary,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub likes: Vec<Uuid>,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Toggle result of a like request
#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub message: String,
    pub liked: bool,
}

/// A notification with its actor
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: Uuid,
    pub from: UserSummary,
    pub to: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Unread notification counter
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// A direct message with sender and receiver display fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: Uuid,
    pub sender: UserSummary,
    pub receiver: UserSummary,
    pub content: String,
    pub read: bool,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MessageDto {
    pub fn new(message: DirectMessage, sender: UserSummary, receiver: UserSummary) -> Self {
        Self {
            id: message.id,
            sender,
            receiver,
            content: message.content,
            read: message.read,
            deleted: message.deleted,
            created_at: message.created_at,
            updated_at: message.updated_at,
        }
    }
}

/// One entry of the conversation list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDto {
    pub user: UserSummary,
    pub last_message: MessageDto,
    pub unread_count: i64,
}

/// Whether the caller has unread direct messages
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadMessagesResponse {
    pub has_unread: bool,
    pub count: i64,
}

/// Result of a read sweep
#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub message: String,
    pub updated: u64,
}
