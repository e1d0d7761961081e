//! Direct Message Handlers
//!
//! REST surface of the messaging service. Sending and read receipts
//! publish the same relay events as the socket.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::application::dto::request::SendMessageRequest;
use crate::application::dto::response::{
    ConversationDto, MarkReadResponse, MessageDto, StatusResponse, UnreadMessagesResponse,
    UserSummary,
};
use crate::presentation::http::extractors::{ValidatedJson, ValidatedPath};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// One entry per conversation partner
pub async fn conversations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ConversationDto>>, AppError> {
    Ok(Json(state.messages.conversations(auth.user_id).await?))
}

/// Recent history with a peer; marks the peer's messages read
pub async fn chat(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(peer_id): ValidatedPath<Uuid>,
) -> Result<Json<Vec<MessageDto>>, AppError> {
    Ok(Json(state.messages.chat(auth.user_id, peer_id).await?))
}

/// Send a message
pub async fn send(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageDto>), AppError> {
    let message = state
        .messages
        .send(auth.user_id, body.receiver_id, &body.content)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Soft-delete a message the caller sent
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(message_id): ValidatedPath<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    state.messages.delete(auth.user_id, message_id).await?;
    Ok(Json(StatusResponse::new("Message deleted successfully")))
}

/// Everyone the caller has exchanged messages with
pub async fn potential_chats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    Ok(Json(state.messages.potential_chats(auth.user_id).await?))
}

pub async fn unread(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UnreadMessagesResponse>, AppError> {
    Ok(Json(state.messages.unread(auth.user_id).await?))
}

/// Mark every message from a peer as read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(peer_id): ValidatedPath<Uuid>,
) -> Result<Json<MarkReadResponse>, AppError> {
    let updated = state.messages.mark_read(auth.user_id, peer_id).await?;
    Ok(Json(MarkReadResponse {
        message: "Messages marked as read".to_string(),
        updated,
    }))
}
