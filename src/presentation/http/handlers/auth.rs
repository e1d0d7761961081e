//! Authentication Handlers

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::application::dto::request::{LoginRequest, SignupRequest};
use crate::application::dto::response::{StatusResponse, UserProfile};
use crate::presentation::http::extractors::ValidatedJson;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// HTTP-only session cookie holding `token`.
fn session_cookie(state: &AppState, token: String) -> Result<Cookie<'static>, AppError> {
    let max_age = state.auth.session_days() * SECONDS_PER_DAY;
    let mut cookie = Cookie::parse(format!(
        "{}={}; Max-Age={}",
        state.settings.jwt.cookie_name, token, max_age
    ))
    .map_err(|e| AppError::Internal(format!("Failed to build session cookie: {}", e)))?
    .into_owned();

    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_secure(!state.settings.is_development());
    Ok(cookie)
}

/// Register a new user
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(body): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, CookieJar, Json<UserProfile>), AppError> {
    let (profile, token) = state.auth.signup(body).await?;
    let jar = jar.add(session_cookie(&state, token)?);
    Ok((StatusCode::CREATED, jar, Json(profile)))
}

/// Login with username or email
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<UserProfile>), AppError> {
    let (profile, token) = state
        .auth
        .login(body.username.as_deref(), body.email.as_deref(), &body.password)
        .await?;
    let jar = jar.add(session_cookie(&state, token)?);

    tracing::debug!(user_id = %profile.id, "User logged in");
    Ok((jar, Json(profile)))
}

/// Clear the session cookie
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<StatusResponse>), AppError> {
    let name = state.settings.jwt.cookie_name.clone();
    if jar.get(&name).is_none() {
        return Err(AppError::BadRequest("Already logged out".into()));
    }

    let jar = jar.remove(Cookie::build(name).path("/"));
    Ok((jar, Json(StatusResponse::new("Logged out successfully"))))
}

/// Profile of the signed-in user
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state.auth.current_profile(auth.user_id).await?;
    Ok(Json(profile))
}
