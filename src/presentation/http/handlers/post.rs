//! Post Handlers

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::application::dto::request::{CommentRequest, CreatePostRequest, EditPostRequest};
use crate::application::dto::response::{LikeResponse, PostView, StatusResponse};
use crate::presentation::http::extractors::{ValidatedJson, ValidatedPath};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Create a post
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostView>), AppError> {
    let post = state.posts.create(auth.user_id, body).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// Edit a post the caller owns
pub async fn edit_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(post_id): ValidatedPath<Uuid>,
    Json(body): Json<EditPostRequest>,
) -> Result<Json<PostView>, AppError> {
    Ok(Json(state.posts.edit(auth.user_id, post_id, body).await?))
}

/// Delete a post the caller owns
pub async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(post_id): ValidatedPath<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    state.posts.delete(auth.user_id, post_id).await?;
    Ok(Json(StatusResponse::new("Post deleted successfully")))
}

/// Like or unlike a post
pub async fn toggle_like(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(post_id): ValidatedPath<Uuid>,
) -> Result<Json<LikeResponse>, AppError> {
    Ok(Json(state.posts.toggle_like(auth.user_id, post_id).await?))
}

/// Comment on a post
pub async fn comment(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(post_id): ValidatedPath<Uuid>,
    ValidatedJson(body): ValidatedJson<CommentRequest>,
) -> Result<Json<PostView>, AppError> {
    Ok(Json(state.posts.comment(auth.user_id, post_id, &body.text).await?))
}

/// Every post, newest first
pub async fn all_posts(State(state): State<AppState>) -> Result<Json<Vec<PostView>>, AppError> {
    Ok(Json(state.posts.all().await?))
}

/// Posts the caller liked
pub async fn liked_posts(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(target): ValidatedPath<Uuid>,
) -> Result<Json<Vec<PostView>>, AppError> {
    Ok(Json(state.posts.liked(auth.user_id, target).await?))
}

/// Posts by followed users
pub async fn following_posts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<PostView>>, AppError> {
    Ok(Json(state.posts.following(auth.user_id).await?))
}

/// Posts by one user
pub async fn user_posts(
    State(state): State<AppState>,
    ValidatedPath(username): ValidatedPath<String>,
) -> Result<Json<Vec<PostView>>, AppError> {
    Ok(Json(state.posts.by_username(&username).await?))
}
