//! WebSocket Connection Handler
//!
//! The session token is checked before the upgrade; an unauthenticated
//! handshake is answered with 401 and never becomes a socket.

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::{ClientEvent, Envelope, ServerEvent};
use super::session::SessionState;
use crate::application::services::{MessageError, MessageService};
use crate::presentation::middleware::session_token;
use crate::shared::error::{AppError, SERVER_ERROR_MESSAGE};
use crate::startup::AppState;

/// Handshake query parameters
#[derive(Debug, Default, Deserialize)]
pub struct SocketParams {
    pub token: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SocketParams>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, AppError> {
    let token = session_token(&headers, &state.settings.jwt.cookie_name).or(params.token);
    let user = state.auth.authenticate(token.as_deref()).await?;

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let limits = &state.settings.websocket;
    Ok(ws
        .max_message_size(limits.max_message_size)
        .max_frame_size(limits.max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, state, user.id)))
}

/// Drive one authenticated socket until it closes
async fn handle_socket(socket: WebSocket, state: AppState, user_id: Uuid) {
    let (mut sender, mut receiver) = socket.split();

    // Create channel for outgoing events
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let connection_id = state.relay.subscribe(user_id, tx.clone());
    let mut session = SessionState::new(connection_id, user_id);

    // Forward queued events to the socket, stamping each with the next seq.
    // Ends once every sender is gone and hands the session back.
    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let frame = Envelope {
                seq: session.next_sequence(),
                event,
            };
            let text = match serde_json::to_string(&frame) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!("Failed to serialize event: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        session
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Some(reply) =
                    handle_client_frame(state.messages.as_ref(), user_id, text.as_str()).await
                {
                    if tx.send(reply).is_err() {
                        break;
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                tracing::debug!(connection_id = %connection_id, "Ignoring binary frame");
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {
                // Pong is handled automatically by axum
            }
            Err(e) => {
                tracing::debug!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Cleanup: dropping the last senders lets the writer drain and stop
    state.relay.unsubscribe(connection_id);
    drop(tx);
    match writer.await {
        Ok(session) => tracing::debug!(
            connection_id = %session.connection_id,
            user_id = %session.user_id,
            frames_sent = session.sequence,
            connected_secs = session.connected_at.elapsed().as_secs(),
            "Relay connection closed"
        ),
        Err(e) => tracing::warn!(connection_id = %connection_id, error = %e, "Relay writer failed"),
    }
}

/// Client-facing text of a messaging failure.
fn client_error(err: MessageError) -> String {
    let err = AppError::from(err);
    if err.status().is_server_error() {
        tracing::error!(error = %err, "Relay request failed");
        SERVER_ERROR_MESSAGE.to_string()
    } else {
        err.public_message()
    }
}

/// Handle one inbound text frame. Returns the reply for this connection, if any.
pub async fn handle_client_frame(
    messages: &dyn MessageService,
    user_id: Uuid,
    text: &str,
) -> Option<ServerEvent> {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(user_id = %user_id, error = %e, "Malformed relay frame");
            return Some(ServerEvent::message_error("Invalid event"));
        }
    };

    match event {
        ClientEvent::SendMessage(payload) => {
            match messages
                .send(user_id, payload.receiver_id, &payload.content)
                .await
            {
                Ok(message) => Some(ServerEvent::MessageSent(message)),
                Err(e) => Some(ServerEvent::message_error(client_error(e))),
            }
        }
        ClientEvent::MarkRead(payload) => {
            match messages.mark_read(user_id, payload.sender_id).await {
                Ok(_) => None,
                Err(e) => Some(ServerEvent::read_error(client_error(e))),
            }
        }
    }
}
