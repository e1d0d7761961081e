//! Notification API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{TestApp, TestUser};

async fn followed_by(app: &TestApp, target: &TestUser, followers: &[&TestUser]) {
    for follower in followers {
        let response = app
            .post(
                &format!("/api/user/follow/{}", target.id),
                Some(&follower.token),
                json!({}),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_listing_marks_notifications_read() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;
    let carol = app.signup().await;
    followed_by(&app, &alice, &[&bob, &carol]).await;

    let unread = app.get("/api/notif/unread", Some(&alice.token)).await;
    assert_eq!(unread.body["count"], 2);

    let first = app.get("/api/notif", Some(&alice.token)).await;
    assert_eq!(first.status, StatusCode::OK);
    let items = first.body.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|n| n["read"] == false));
    assert!(items.iter().all(|n| n["to"] == alice.id.to_string()));

    let unread = app.get("/api/notif/unread", Some(&alice.token)).await;
    assert_eq!(unread.body["count"], 0);

    let second = app.get("/api/notif", Some(&alice.token)).await;
    assert!(second
        .body
        .as_array()
        .unwrap()
        .iter()
        .all(|n| n["read"] == true));
}

#[tokio::test]
async fn test_empty_inbox_is_not_found() {
    let app = TestApp::new();
    let alice = app.signup().await;

    let list = app.get("/api/notif", Some(&alice.token)).await;
    assert_eq!(list.status, StatusCode::NOT_FOUND);
    assert_eq!(list.message(), "No notifications found");

    let delete_all = app.delete("/api/notif", Some(&alice.token)).await;
    assert_eq!(delete_all.status, StatusCode::NOT_FOUND);
    assert_eq!(delete_all.message(), "No notifications to delete");
}

#[tokio::test]
async fn test_only_recipient_deletes_notification() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;
    followed_by(&app, &alice, &[&bob]).await;

    let list = app.get("/api/notif", Some(&alice.token)).await;
    let id = list.body[0]["id"].as_str().unwrap().to_string();

    let by_actor = app.delete(&format!("/api/notif/{}", id), Some(&bob.token)).await;
    assert_eq!(by_actor.status, StatusCode::FORBIDDEN);

    let by_owner = app.delete(&format!("/api/notif/{}", id), Some(&alice.token)).await;
    assert_eq!(by_owner.status, StatusCode::OK);
    assert_eq!(by_owner.message(), "Notification deleted successfully");

    let again = app.delete(&format!("/api/notif/{}", id), Some(&alice.token)).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_all_notifications() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;
    let carol = app.signup().await;
    followed_by(&app, &alice, &[&bob, &carol]).await;

    let response = app.delete("/api/notif", Some(&alice.token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.message(), "Notifications deleted successfully");

    let list = app.get("/api/notif", Some(&alice.token)).await;
    assert_eq!(list.status, StatusCode::NOT_FOUND);
}
