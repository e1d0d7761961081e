//! User Handlers

use axum::{
    extract::State,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use uuid::Uuid;

use crate::application::dto::request::UpdateProfileRequest;
use crate::application::dto::response::{FollowResponse, StatusResponse, UserProfile};
use crate::presentation::http::extractors::{ValidatedJson, ValidatedPath};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Search profiles by username fragment
pub async fn search(
    State(state): State<AppState>,
    ValidatedPath(name): ValidatedPath<String>,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    Ok(Json(state.users.search(&name).await?))
}

/// Suggested users to follow
pub async fn suggested(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    Ok(Json(state.users.suggested(auth.user_id).await?))
}

/// Users the caller follows
pub async fn following(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    Ok(Json(state.users.following(auth.user_id).await?))
}

/// Follow or unfollow a user
pub async fn toggle_follow(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(target): ValidatedPath<Uuid>,
) -> Result<Json<FollowResponse>, AppError> {
    Ok(Json(state.users.toggle_follow(auth.user_id, target).await?))
}

/// Partial profile update
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(state.users.update_profile(auth.user_id, body).await?))
}

/// Delete the caller's account and end the session
pub async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<StatusResponse>), AppError> {
    state.users.delete_account(auth.user_id).await?;

    let jar = jar.remove(Cookie::build(state.settings.jwt.cookie_name.clone()).path("/"));
    Ok((jar, Json(StatusResponse::new("User deleted successfully"))))
}
