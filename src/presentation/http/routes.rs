//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{auth_middleware, logging};
use crate::presentation::websocket::ws_handler;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes(state.clone()))
        // Real-time relay; authenticates during the handshake
        .route("/socket", get(ws_handler))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(logging::track_metrics))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> Result<impl IntoResponse, AppError> {
    let metrics = metrics::gather_metrics()
        .map_err(|e| AppError::Internal(format!("Failed to encode metrics: {}", e)))?;
    Ok((
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    ))
}

/// API routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes(state.clone()))
        .nest("/user", user_routes(state.clone()))
        .nest("/post", post_routes(state.clone()))
        .nest("/notif", notification_routes(state.clone()))
        .nest("/message", message_routes(state))
}

/// Authentication routes
fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(handlers::auth::me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .merge(protected)
}

/// User routes (search is public)
fn user_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/suggested", get(handlers::user::suggested))
        .route("/following", get(handlers::user::following))
        .route("/follow/{id}", post(handlers::user::toggle_follow))
        .route("/update", post(handlers::user::update_profile))
        .route("/delete", delete(handlers::user::delete_account))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/profile/{name}", get(handlers::user::search))
        .merge(protected)
}

/// Post routes (the global feed and per-user listings are public)
fn post_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/create", post(handlers::post::create_post))
        .route("/edit/{id}", post(handlers::post::edit_post))
        .route("/like/{id}", post(handlers::post::toggle_like))
        .route("/comment/{id}", post(handlers::post::comment))
        .route("/liked/{id}", get(handlers::post::liked_posts))
        .route("/following", get(handlers::post::following_posts))
        .route("/{id}", delete(handlers::post::delete_post))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/all", get(handlers::post::all_posts))
        .route("/user/{username}", get(handlers::post::user_posts))
        .merge(protected)
}

/// Notification routes (protected)
fn notification_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::notification::list).delete(handlers::notification::delete_all),
        )
        .route("/unread", get(handlers::notification::unread_count))
        .route("/{id}", delete(handlers::notification::delete_one))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Direct message routes (protected)
fn message_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/conversations", get(handlers::message::conversations))
        .route("/chat/{user_id}", get(handlers::message::chat))
        .route("/send", post(handlers::message::send))
        .route("/potential-chats", get(handlers::message::potential_chats))
        .route("/unread", get(handlers::message::unread))
        .route("/read/{user_id}", post(handlers::message::mark_read))
        .route("/{message_id}", delete(handlers::message::delete))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
