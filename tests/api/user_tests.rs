//! User API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{TestApp, PASSWORD};

#[tokio::test]
async fn test_follow_toggles_and_notifies() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;

    let followed = app
        .post(&format!("/api/user/follow/{}", bob.id), Some(&alice.token), json!({}))
        .await;
    assert_eq!(followed.status, StatusCode::OK);
    assert_eq!(followed.body["following"], true);
    assert_eq!(followed.message(), "Followed successfully");

    let me = app.get("/api/auth/me", Some(&bob.token)).await;
    assert_eq!(me.body["followers"], json!([alice.id]));

    let notifications = app.get("/api/notif", Some(&bob.token)).await;
    assert_eq!(notifications.status, StatusCode::OK);
    assert_eq!(notifications.body[0]["type"], "follow");
    assert_eq!(notifications.body[0]["from"]["id"], alice.id.to_string());

    let unfollowed = app
        .post(&format!("/api/user/follow/{}", bob.id), Some(&alice.token), json!({}))
        .await;
    assert_eq!(unfollowed.body["following"], false);

    let me = app.get("/api/auth/me", Some(&bob.token)).await;
    assert_eq!(me.body["followers"], json!([]));
}

#[tokio::test]
async fn test_cannot_follow_self() {
    let app = TestApp::new();
    let alice = app.signup().await;

    let response = app
        .post(&format!("/api/user/follow/{}", alice.id), Some(&alice.token), json!({}))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "You can't follow or unfollow yourself");
}

#[tokio::test]
async fn test_following_lists_followed_profiles() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;
    app.post(&format!("/api/user/follow/{}", bob.id), Some(&alice.token), json!({}))
        .await;

    let response = app.get("/api/user/following", Some(&alice.token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 1);
    assert_eq!(response.body[0]["username"], bob.username.as_str());
}

#[tokio::test]
async fn test_search_matches_username_fragment() {
    let app = TestApp::new();
    let alice = app.signup().await;
    app.signup().await;

    let fragment = &alice.username[alice.username.len() - 8..];
    let response = app.get(&format!("/api/user/profile/{}", fragment), None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 1);
    assert_eq!(response.body[0]["id"], alice.id.to_string());
}

#[tokio::test]
async fn test_suggested_excludes_self_and_followed() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;
    let carol = app.signup().await;
    app.post(&format!("/api/user/follow/{}", bob.id), Some(&alice.token), json!({}))
        .await;

    let response = app.get("/api/user/suggested", Some(&alice.token)).await;

    assert_eq!(response.status, StatusCode::OK);
    let ids: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|u| u["id"].as_str())
        .collect();
    assert!(ids.contains(&carol.id.to_string().as_str()));
    assert!(!ids.contains(&alice.id.to_string().as_str()));
    assert!(!ids.contains(&bob.id.to_string().as_str()));
}

#[tokio::test]
async fn test_update_profile_fields() {
    let app = TestApp::new();
    let alice = app.signup().await;

    let response = app
        .post(
            "/api/user/update",
            Some(&alice.token),
            json!({ "bio": "Hello there", "link": "https://alice.dev" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["bio"], "Hello there");
    assert_eq!(response.body["link"], "https://alice.dev");
    assert_eq!(response.body["profileImg"], "https://images.invalid/blank.png");
}

#[tokio::test]
async fn test_password_change_requires_current_password() {
    let app = TestApp::new();
    let alice = app.signup().await;

    let only_new = app
        .post(
            "/api/user/update",
            Some(&alice.token),
            json!({ "newPassword": "N3wPassw0rd!" }),
        )
        .await;
    assert_eq!(only_new.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        only_new.message(),
        "Both current password and new password are required"
    );

    let wrong = app
        .post(
            "/api/user/update",
            Some(&alice.token),
            json!({ "currentPassword": "nope", "newPassword": "N3wPassw0rd!" }),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong.message(), "Current password entered is incorrect");

    let changed = app
        .post(
            "/api/user/update",
            Some(&alice.token),
            json!({ "currentPassword": PASSWORD, "newPassword": "N3wPassw0rd!" }),
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK);

    let login = app
        .post(
            "/api/auth/login",
            None,
            json!({ "username": alice.username, "password": "N3wPassw0rd!" }),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_email_conflict() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;

    let response = app
        .post("/api/user/update", Some(&alice.token), json!({ "email": bob.email }))
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.message(), "Email already exists");
}

#[tokio::test]
async fn test_delete_account_cascades() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;

    let bobs_post = app.create_post(&bob, "Bob's post").await;
    app.create_post(&alice, "Alice's post").await;
    app.post(&format!("/api/user/follow/{}", bob.id), Some(&alice.token), json!({}))
        .await;
    app.post(&format!("/api/user/follow/{}", alice.id), Some(&bob.token), json!({}))
        .await;
    app.post(&format!("/api/post/like/{}", bobs_post), Some(&alice.token), json!({}))
        .await;
    app.send_message(&alice, &bob, "bye").await;

    let deleted = app.delete("/api/user/delete", Some(&alice.token)).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.message(), "User deleted successfully");

    // The old session no longer resolves to a user
    let me = app.get("/api/auth/me", Some(&alice.token)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);

    // Follow edges in both directions are gone
    let bob_profile = app.get("/api/auth/me", Some(&bob.token)).await;
    assert_eq!(bob_profile.body["followers"], json!([]));
    assert_eq!(bob_profile.body["following"], json!([]));

    // Alice's posts and likes are gone
    let posts = app.get("/api/post/all", None).await;
    let posts = posts.body.as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["id"], bobs_post.to_string());
    assert_eq!(posts[0]["likes"], json!([]));

    // Notifications from Alice are gone
    let notifications = app.get("/api/notif", Some(&bob.token)).await;
    assert_eq!(notifications.status, StatusCode::NOT_FOUND);

    // So is the conversation
    let conversations = app.get("/api/message/conversations", Some(&bob.token)).await;
    assert_eq!(conversations.body, json!([]));
}
