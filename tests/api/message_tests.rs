//! Direct Message API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use crate::common::TestApp;

#[tokio::test]
async fn test_send_persists_populated_unread_message() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;

    let response = app
        .post(
            "/api/message/send",
            Some(&alice.token),
            json!({ "receiverId": bob.id, "content": "  hi bob  " }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["content"], "hi bob");
    assert_eq!(response.body["read"], false);
    assert_eq!(response.body["deleted"], false);
    assert_eq!(response.body["sender"]["username"], alice.username.as_str());
    assert_eq!(response.body["receiver"]["username"], bob.username.as_str());

    // Bob was never connected to the relay; the message is still there
    let chat = app
        .get(&format!("/api/message/chat/{}", alice.id), Some(&bob.token))
        .await;
    assert_eq!(chat.status, StatusCode::OK);
    let history = chat.body.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"], response.body["id"]);
}

#[tokio::test]
async fn test_send_rejects_bad_input() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;

    let blank = app
        .post(
            "/api/message/send",
            Some(&alice.token),
            json!({ "receiverId": bob.id, "content": "   " }),
        )
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.message(), "Invalid message data");

    let too_long = app
        .post(
            "/api/message/send",
            Some(&alice.token),
            json!({ "receiverId": bob.id, "content": "x".repeat(2001) }),
        )
        .await;
    assert_eq!(too_long.status, StatusCode::BAD_REQUEST);
    assert_eq!(too_long.message(), "Message must be at most 2000 characters");

    let nobody = app
        .post(
            "/api/message/send",
            Some(&alice.token),
            json!({ "receiverId": Uuid::new_v4(), "content": "hello?" }),
        )
        .await;
    assert_eq!(nobody.status, StatusCode::NOT_FOUND);
    assert_eq!(nobody.message(), "Receiver not found");
}

#[tokio::test]
async fn test_send_limit_applies_to_trimmed_content() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;
    let padded = format!("{}   ", "x".repeat(2000));

    let response = app
        .post(
            "/api/message/send",
            Some(&alice.token),
            json!({ "receiverId": bob.id, "content": padded }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["content"].as_str().unwrap().len(), 2000);
}

#[tokio::test]
async fn test_mark_read_only_touches_peer_messages() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let peer = app.signup().await;
    let other = app.signup().await;

    app.send_message(&peer, &alice, "one").await;
    app.send_message(&peer, &alice, "two").await;
    app.send_message(&other, &alice, "elsewhere").await;
    app.send_message(&alice, &peer, "outbound").await;

    let unread = app.get("/api/message/unread", Some(&alice.token)).await;
    assert_eq!(unread.body["count"], 3);
    assert_eq!(unread.body["hasUnread"], true);

    let marked = app
        .post(&format!("/api/message/read/{}", peer.id), Some(&alice.token), json!({}))
        .await;
    assert_eq!(marked.status, StatusCode::OK);
    assert_eq!(marked.body["updated"], 2);

    // Only the message from the other sender is still unread
    let unread = app.get("/api/message/unread", Some(&alice.token)).await;
    assert_eq!(unread.body["count"], 1);

    let conversations = app.get("/api/message/conversations", Some(&alice.token)).await;
    for entry in conversations.body.as_array().unwrap() {
        let expected = if entry["user"]["id"] == other.id.to_string() { 1 } else { 0 };
        assert_eq!(entry["unreadCount"], expected);
    }

    // Alice's own outbound message is still unread for the peer
    let peer_unread = app.get("/api/message/unread", Some(&peer.token)).await;
    assert_eq!(peer_unread.body["count"], 1);
}

#[tokio::test]
async fn test_opening_chat_marks_peer_messages_read() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;
    app.send_message(&bob, &alice, "ping").await;

    app.get(&format!("/api/message/chat/{}", bob.id), Some(&alice.token))
        .await;

    let unread = app.get("/api/message/unread", Some(&alice.token)).await;
    assert_eq!(unread.body["count"], 0);
    assert_eq!(unread.body["hasUnread"], false);
}

#[tokio::test]
async fn test_soft_delete_hides_message() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;
    let first = app.send_message(&alice, &bob, "first").await;
    let second = app.send_message(&alice, &bob, "second").await;

    let by_receiver = app
        .delete(&format!("/api/message/{}", first), Some(&bob.token))
        .await;
    assert_eq!(by_receiver.status, StatusCode::NOT_FOUND);
    assert_eq!(by_receiver.message(), "Message not found");

    let response = app
        .delete(&format!("/api/message/{}", second), Some(&alice.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.message(), "Message deleted successfully");

    let chat = app
        .get(&format!("/api/message/chat/{}", alice.id), Some(&bob.token))
        .await;
    let history = chat.body.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"], first.to_string());

    let conversations = app.get("/api/message/conversations", Some(&bob.token)).await;
    assert_eq!(conversations.body[0]["lastMessage"]["id"], first.to_string());

    // Still a known partner even though a message was removed
    let partners = app.get("/api/message/potential-chats", Some(&bob.token)).await;
    assert_eq!(partners.body[0]["id"], alice.id.to_string());
}

#[tokio::test]
async fn test_conversations_one_entry_per_partner() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;
    let carol = app.signup().await;
    app.send_message(&bob, &alice, "from bob").await;
    app.send_message(&alice, &bob, "reply").await;
    app.send_message(&carol, &alice, "from carol").await;

    let response = app.get("/api/message/conversations", Some(&alice.token)).await;

    assert_eq!(response.status, StatusCode::OK);
    let entries = response.body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    let with_bob = entries
        .iter()
        .find(|e| e["user"]["id"] == bob.id.to_string())
        .unwrap();
    assert_eq!(with_bob["lastMessage"]["content"], "reply");
    assert_eq!(with_bob["unreadCount"], 1);
}

#[tokio::test]
async fn test_messages_require_session() {
    let app = TestApp::new();

    let response = app.get("/api/message/conversations", None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "Session expired, login again");
}
