//! Authentication API Tests

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::ServiceExt;

use crate::common::{session_cookie, session_cookie_header, unique_username, TestApp, PASSWORD};

#[tokio::test]
async fn test_signup_sets_session_cookie() {
    let app = TestApp::new();
    let username = unique_username();

    let response = app
        .post(
            "/api/auth/signup",
            None,
            json!({
                "username": username,
                "name": "Test User",
                "email": format!("{}@example.com", username),
                "password": PASSWORD,
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["username"], username.as_str());
    assert_eq!(response.body["followers"], json!([]));
    assert!(response.body.get("password").is_none());

    let cookie = session_cookie_header(&response.headers).unwrap();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Max-Age=1296000"));
}

#[tokio::test]
async fn test_signup_with_missing_fields_fails() {
    let app = TestApp::new();

    let response = app
        .post("/api/auth/signup", None, json!({ "username": "lonely" }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(!response.message().is_empty());
}

#[tokio::test]
async fn test_signup_with_weak_password_fails() {
    let app = TestApp::new();
    let username = unique_username();

    let response = app
        .post(
            "/api/auth/signup",
            None,
            json!({
                "username": username,
                "name": "Weak",
                "email": format!("{}@example.com", username),
                "password": "alllowercase1",
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Invalid password");
}

#[tokio::test]
async fn test_signup_with_duplicate_username_fails() {
    let app = TestApp::new();
    let existing = app.signup().await;

    let response = app
        .post(
            "/api/auth/signup",
            None,
            json!({
                "username": existing.username,
                "name": "Copycat",
                "email": "someone-else@example.com",
                "password": PASSWORD,
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.message(), "Username already exists");
}

#[tokio::test]
async fn test_login_with_username_or_email() {
    let app = TestApp::new();
    let user = app.signup().await;

    let by_username = app
        .post(
            "/api/auth/login",
            None,
            json!({ "username": user.username, "password": PASSWORD }),
        )
        .await;
    assert_eq!(by_username.status, StatusCode::OK);
    assert!(session_cookie(&by_username.headers).is_some());

    let by_email = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": user.email, "password": PASSWORD }),
        )
        .await;
    assert_eq!(by_email.status, StatusCode::OK);
    assert_eq!(by_email.body["id"], user.id.to_string());
}

#[tokio::test]
async fn test_login_with_wrong_password_fails() {
    let app = TestApp::new();
    let user = app.signup().await;

    let response = app
        .post(
            "/api/auth/login",
            None,
            json!({ "username": user.username, "password": "Wr0ngPass!" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Invalid credentials");
}

#[tokio::test]
async fn test_login_without_identifier_fails() {
    let app = TestApp::new();

    let response = app
        .post("/api/auth/login", None, json!({ "password": PASSWORD }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Please provide username or email");
}

#[tokio::test]
async fn test_me_requires_session() {
    let app = TestApp::new();

    let missing = app.get("/api/auth/me", None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.message(), "Session expired, login again");

    let garbage = app.get("/api/auth/me", Some("not-a-token")).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.message(), "Invalid token");
}

#[tokio::test]
async fn test_me_returns_profile() {
    let app = TestApp::new();
    let user = app.signup().await;

    let response = app.get("/api/auth/me", Some(&user.token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], user.username.as_str());
}

#[tokio::test]
async fn test_session_cookie_authenticates() {
    let app = TestApp::new();
    let user = app.signup().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header(header::COOKIE, format!("jwt={}", user.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::new();
    let user = app.signup().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .header(header::COOKIE, format!("jwt={}", user.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cleared = session_cookie(response.headers()).unwrap();
    assert_eq!(cleared, "");
}

#[tokio::test]
async fn test_logout_without_session_fails() {
    let app = TestApp::new();

    let response = app.request(axum::http::Method::POST, "/api/auth/logout", None, None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Already logged out");
}
