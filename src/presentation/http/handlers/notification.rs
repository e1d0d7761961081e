//! Notification Handlers

use axum::{
    extract::State,
    Json,
};
use uuid::Uuid;

use crate::application::dto::response::{NotificationView, StatusResponse, UnreadCountResponse};
use crate::presentation::http::extractors::ValidatedPath;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// The caller's notifications; marks them read
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<NotificationView>>, AppError> {
    Ok(Json(state.notifications.list(auth.user_id).await?))
}

pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let count = state.notifications.unread_count(auth.user_id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

pub async fn delete_one(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(notification_id): ValidatedPath<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    state
        .notifications
        .delete(auth.user_id, notification_id)
        .await?;
    Ok(Json(StatusResponse::new("Notification deleted successfully")))
}

pub async fn delete_all(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<StatusResponse>, AppError> {
    state.notifications.delete_all(auth.user_id).await?;
    Ok(Json(StatusResponse::new("Notifications deleted successfully")))
}
