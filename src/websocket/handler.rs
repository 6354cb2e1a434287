//! WebSocket Handler
//!
//! Upgrades `GET /ws` requests and runs the per-connection send and receive tasks.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::hub::ChatHub;
use super::messages::{ClientEvent, ServerEvent};
use crate::api::AppState;

/// Display name for connections without a known credential
const ANONYMOUS_NAME: &str = "Invitado";

/// Query parameters accepted on the upgrade request
#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    /// Bearer token issued by `POST /auth`
    pub token: Option<String>,
}

/// WebSocket upgrade handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let user_name = match params.token.as_deref() {
        Some(token) => state
            .user_for_token(token)
            .await
            .map(|u| u.display_name())
            .unwrap_or_else(|| ANONYMOUS_NAME.to_string()),
        None => ANONYMOUS_NAME.to_string(),
    };
    let hub = Arc::clone(&state.chat_hub);
    ws.on_upgrade(move |socket| handle_socket(socket, hub, user_name))
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, hub: Arc<ChatHub>, user_name: String) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    let identity = match hub.register(tx, user_name).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::error!(error = %e, "Failed to register chat connection");
            let error_event = ServerEvent::Error {
                message: e.to_string(),
            };
            if let Ok(text) = serde_json::to_string(&error_event) {
                let _ = sender.send(Message::Text(text)).await;
            }
            return;
        }
    };
    let connection_id = identity.id.clone();

    // The identity frame is queued ahead of anything the send task forwards
    if hub
        .send_to(&connection_id, ServerEvent::Identity(identity))
        .await
        .is_err()
    {
        hub.unregister(&connection_id).await;
        return;
    }

    let conn_id_for_send = connection_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(text) => {
                    if sender.send(Message::Text(text)).await.is_err() {
                        tracing::debug!(
                            connection_id = %conn_id_for_send,
                            "WebSocket send failed, closing connection"
                        );
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize chat event");
                }
            }
        }
    });

    let hub_for_recv = Arc::clone(&hub);
    let conn_id_for_recv = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_ws_message(&hub_for_recv, &conn_id_for_recv, msg).await {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %conn_id_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    hub.unregister(&connection_id).await;
}

/// Handle a received WebSocket frame
///
/// Returns false if the connection should be closed.
async fn handle_ws_message(hub: &Arc<ChatHub>, connection_id: &str, message: Message) -> bool {
    match message {
        Message::Text(text) => {
            match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => handle_client_event(hub, connection_id, event).await,
                Err(e) => {
                    tracing::debug!(
                        connection_id = %connection_id,
                        error = %e,
                        "Invalid client event"
                    );
                    let error_event = ServerEvent::Error {
                        message: format!("Invalid event format: {}", e),
                    };
                    let _ = hub.send_to(connection_id, error_event).await;
                }
            }
            true
        }
        Message::Binary(_) => {
            let error_event = ServerEvent::Error {
                message: "Binary frames not supported".to_string(),
            };
            let _ = hub.send_to(connection_id, error_event).await;
            true
        }
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(connection_id = %connection_id, "Client requested close");
            false
        }
    }
}

async fn handle_client_event(hub: &Arc<ChatHub>, connection_id: &str, event: ClientEvent) {
    match event {
        ClientEvent::GetMessages => {
            let history = hub.history().await;
            let _ = hub.send_to(connection_id, ServerEvent::History(history)).await;
        }
        ClientEvent::Message(outgoing) => {
            if let Err(e) = hub.post(outgoing).await {
                tracing::debug!(connection_id = %connection_id, error = %e, "Rejected chat message");
                let error_event = ServerEvent::Error {
                    message: e.to_string(),
                };
                let _ = hub.send_to(connection_id, error_event).await;
            }
        }
    }
}
