//! Relay Tests
//!
//! The handshake is checked through the router, event fan-out by
//! subscribing straight to the app's relay hub, and the whole socket
//! round trip against a bound listener.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use futures::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use sociostack::presentation::websocket::handler::handle_client_frame;
use sociostack::presentation::websocket::ServerEvent;

use crate::common::{TestApp, TestUser};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Serve the app's router on an ephemeral port
async fn serve(app: &TestApp) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    addr
}

async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Open a socket for `user` and wait until the relay has subscribed it
async fn connect(app: &TestApp, addr: SocketAddr, user: &TestUser) -> Socket {
    let url = format!("ws://{}/socket?token={}", addr, user.token);
    let (socket, _) = connect_async(url).await.unwrap();
    wait_until(|| app.state.relay.is_online(user.id)).await;
    socket
}

async fn send_frame(socket: &mut Socket, frame: Value) {
    socket.send(Message::text(frame.to_string())).await.unwrap();
}

/// Next text frame, parsed
async fn next_frame(socket: &mut Socket) -> Value {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("no frame in time")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

#[tokio::test]
async fn test_socket_round_trip() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;
    let addr = serve(&app).await;

    let mut alice_socket = connect(&app, addr, &alice).await;
    let mut bob_socket = connect(&app, addr, &bob).await;

    send_frame(
        &mut alice_socket,
        json!({ "event": "send_message", "data": { "receiverId": bob.id, "content": " hello " } }),
    )
    .await;

    let sent = next_frame(&mut alice_socket).await;
    assert_eq!(sent["seq"], 1);
    assert_eq!(sent["event"], "message_sent");
    assert_eq!(sent["data"]["content"], "hello");

    let received = next_frame(&mut bob_socket).await;
    assert_eq!(received["seq"], 1);
    assert_eq!(received["event"], "receive_message");
    assert_eq!(received["data"]["id"], sent["data"]["id"]);
    assert_eq!(received["data"]["sender"]["id"], json!(alice.id));

    send_frame(
        &mut bob_socket,
        json!({ "event": "mark_read", "data": { "senderId": alice.id } }),
    )
    .await;

    let read = next_frame(&mut alice_socket).await;
    assert_eq!(read["seq"], 2);
    assert_eq!(read["event"], "messages_read");
    assert_eq!(read["data"]["reader"], json!(bob.id));

    bob_socket.close(None).await.unwrap();
    wait_until(|| !app.state.relay.is_online(bob.id)).await;
    assert!(app.state.relay.is_online(alice.id));
}

#[tokio::test]
async fn test_handshake_requires_session() {
    let app = TestApp::new();

    let missing = app.get("/socket", None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let invalid = app.get("/socket?token=garbage", None).await;
    assert_eq!(invalid.status, StatusCode::UNAUTHORIZED);
    assert_eq!(invalid.message(), "Invalid token");
}

#[tokio::test]
async fn test_authenticated_handshake_reaches_upgrade() {
    let app = TestApp::new();
    let alice = app.signup().await;

    // A plain GET is not an upgrade request, but it gets past auth
    let response = app
        .get(&format!("/socket?token={}", alice.token), None)
        .await;

    assert!(response.status.is_client_error());
    assert_ne!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rest_send_reaches_connected_receiver() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    app.state.relay.subscribe(bob.id, tx);

    let id = app.send_message(&alice, &bob, "live").await;

    match rx.recv().await {
        Some(ServerEvent::ReceiveMessage(message)) => {
            assert_eq!(message.id, id);
            assert_eq!(message.content, "live");
            assert_eq!(message.sender.id, alice.id);
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_read_receipt_reaches_sender() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;
    app.send_message(&alice, &bob, "did you see this").await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    app.state.relay.subscribe(alice.id, tx);

    app.post(&format!("/api/message/read/{}", alice.id), Some(&bob.token), json!({}))
        .await;

    assert_eq!(rx.recv().await, Some(ServerEvent::MessagesRead { reader: bob.id }));
}

#[tokio::test]
async fn test_socket_send_without_receiver_connection_is_retrievable() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;

    let frame = json!({
        "event": "send_message",
        "data": { "receiverId": bob.id, "content": "are you there" }
    });
    let reply = handle_client_frame(app.state.messages.as_ref(), alice.id, &frame.to_string()).await;

    let sent = match reply {
        Some(ServerEvent::MessageSent(message)) => message,
        other => panic!("unexpected reply: {:?}", other),
    };
    assert!(!app.state.relay.is_online(bob.id));

    let chat = app
        .get(&format!("/api/message/chat/{}", alice.id), Some(&bob.token))
        .await;
    assert_eq!(chat.body[0]["id"], sent.id.to_string());
}

#[tokio::test]
async fn test_socket_send_error_goes_to_sender_only() {
    let app = TestApp::new();
    let alice = app.signup().await;
    let bob = app.signup().await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    app.state.relay.subscribe(bob.id, tx);

    let frame = json!({
        "event": "send_message",
        "data": { "receiverId": bob.id, "content": "" }
    });
    let reply = handle_client_frame(app.state.messages.as_ref(), alice.id, &frame.to_string()).await;

    assert_eq!(reply, Some(ServerEvent::message_error("Invalid message data")));
    assert!(rx.try_recv().is_err());
}
