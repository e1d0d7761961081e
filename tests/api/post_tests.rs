//! Post API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use crate::common::TestApp;

#[tokio::test]
async fn test_create_post() {
    let app = TestApp::new();
    let alice = app.signup().await;

    let response = app
        .post(
            "/api/post/create",
            Some(&alice.token),
            json!({ "title": "  First  ", "description": "Hello world" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["title"], "First");
    assert_eq!(response.body["user"]["username"], alice.username.as_str());
    assert_eq!(response.body["image"], json!(null));
    assert_eq!(response.body["likes"], json!([]));
}

#[tokio::test]
async fn test_create_post_requires_fields() {
    let app = TestApp::new();
    let alice = app.signup().await;

    let response = app
        .post("/api/post/create", Some(&alice.token), json!({ "title": "Only a title" }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Please provide all the fields");
}

#[tokio::test]
async fn test_create_post_requires_session() {
    let app = TestApp::new();

    let response = app
        .post("/api/post/create", None, json!({ "title": "a", "description": "b" }))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_like_twice_toggles_without_duplicates() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;
    let post = app.create_post(&alice, "Likeable").await;
    let like_uri = format!("/api/post/like/{}", post);

    let liked = app.post(&like_uri, Some(&bob.token), json!({})).await;
    assert_eq!(liked.status, StatusCode::OK);
    assert_eq!(liked.body["liked"], true);

    let posts = app.get("/api/post/all", None).await;
    assert_eq!(posts.body[0]["likes"], json!([bob.id]));

    let unliked = app.post(&like_uri, Some(&bob.token), json!({})).await;
    assert_eq!(unliked.body["liked"], false);
    assert_eq!(unliked.message(), "Unliked successfully");

    let posts = app.get("/api/post/all", None).await;
    assert_eq!(posts.body[0]["likes"], json!([]));

    // One notification for the owner, from the first like only
    let notifications = app.get("/api/notif", Some(&alice.token)).await;
    assert_eq!(notifications.body.as_array().unwrap().len(), 1);
    assert_eq!(notifications.body[0]["type"], "like");
}

#[tokio::test]
async fn test_liking_own_post_does_not_notify() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let post = app.create_post(&alice, "Mine").await;

    app.post(&format!("/api/post/like/{}", post), Some(&alice.token), json!({}))
        .await;

    let unread = app.get("/api/notif/unread", Some(&alice.token)).await;
    assert_eq!(unread.body["count"], 0);
}

#[tokio::test]
async fn test_like_unknown_post_is_not_found() {
    let app = TestApp::new();
    let alice = app.signup().await;

    let response = app
        .post(&format!("/api/post/like/{}", Uuid::new_v4()), Some(&alice.token), json!({}))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), "Post not found");
}

#[tokio::test]
async fn test_malformed_path_id_answers_with_json_message() {
    let app = TestApp::new();
    let alice = app.signup().await;

    let like = app
        .post("/api/post/like/not-a-uuid", Some(&alice.token), json!({}))
        .await;
    let chat = app.get("/api/message/chat/not-a-uuid", Some(&alice.token)).await;
    let notif = app.delete("/api/notif/not-a-uuid", Some(&alice.token)).await;

    for response in [like, chat, notif] {
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers[axum::http::header::CONTENT_TYPE],
            "application/json"
        );
        assert!(
            response.message().starts_with("Invalid URL"),
            "{:?}",
            response.body
        );
    }
}

#[tokio::test]
async fn test_only_owner_edits_and_deletes() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;
    let post = app.create_post(&alice, "Original").await;

    let edit = app
        .post(&format!("/api/post/edit/{}", post), Some(&bob.token), json!({ "title": "Hijacked" }))
        .await;
    assert_eq!(edit.status, StatusCode::FORBIDDEN);
    assert_eq!(edit.message(), "You are not authorized to edit this post");

    let delete = app.delete(&format!("/api/post/{}", post), Some(&bob.token)).await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);

    let delete = app.delete(&format!("/api/post/{}", post), Some(&alice.token)).await;
    assert_eq!(delete.status, StatusCode::OK);
    assert_eq!(delete.message(), "Post deleted successfully");
}

#[tokio::test]
async fn test_edit_keeps_blank_fields() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let post = app.create_post(&alice, "Original").await;

    let response = app
        .post(
            &format!("/api/post/edit/{}", post),
            Some(&alice.token),
            json!({ "title": "", "description": "Updated words" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["title"], "Original");
    assert_eq!(response.body["description"], "Updated words");
}

#[tokio::test]
async fn test_comment_is_populated() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;
    let post = app.create_post(&alice, "Discuss").await;

    let response = app
        .post(
            &format!("/api/post/comment/{}", post),
            Some(&bob.token),
            json!({ "text": "Nice one" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["comments"][0]["text"], "Nice one");
    assert_eq!(response.body["comments"][0]["user"]["id"], bob.id.to_string());

    let blank = app
        .post(
            &format!("/api/post/comment/{}", post),
            Some(&bob.token),
            json!({ "text": "  " }),
        )
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.message(), "Please provide comment");
}

#[tokio::test]
async fn test_empty_feed_is_not_found() {
    let app = TestApp::new();

    let response = app.get("/api/post/all", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), "No posts found");
}

#[tokio::test]
async fn test_all_posts_newest_first() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let first = app.create_post(&alice, "First").await;
    let second = app.create_post(&alice, "Second").await;

    let response = app.get("/api/post/all", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body[0]["id"], second.to_string());
    assert_eq!(response.body[1]["id"], first.to_string());
}

#[tokio::test]
async fn test_following_feed() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;
    let carol = app.signup().await;
    let bobs = app.create_post(&bob, "From Bob").await;
    app.create_post(&carol, "From Carol").await;

    let empty = app.get("/api/post/following", Some(&alice.token)).await;
    assert_eq!(empty.status, StatusCode::OK);
    assert_eq!(empty.body, json!([]));

    app.post(&format!("/api/user/follow/{}", bob.id), Some(&alice.token), json!({}))
        .await;

    let feed = app.get("/api/post/following", Some(&alice.token)).await;
    assert_eq!(feed.body.as_array().unwrap().len(), 1);
    assert_eq!(feed.body[0]["id"], bobs.to_string());
}

#[tokio::test]
async fn test_liked_posts_are_private() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;
    let post = app.create_post(&bob, "Likeable").await;
    app.post(&format!("/api/post/like/{}", post), Some(&alice.token), json!({}))
        .await;

    let own = app
        .get(&format!("/api/post/liked/{}", alice.id), Some(&alice.token))
        .await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body[0]["id"], post.to_string());

    let other = app
        .get(&format!("/api/post/liked/{}", alice.id), Some(&bob.token))
        .await;
    assert_eq!(other.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_user_posts_by_username() {
    let app = TestApp::new();
    let alice = app.signup().await;
    app.create_post(&alice, "Hers").await;

    let found = app.get(&format!("/api/post/user/{}", alice.username), None).await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body.as_array().unwrap().len(), 1);

    let missing = app.get("/api/post/user/nobody_here", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.message(), "User not found");
}
