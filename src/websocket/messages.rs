//! Chat Wire Protocol
//!
//! Every WebSocket text frame is a JSON object `{"event": <name>, "data": <payload>}`.
//! Event names follow the chat gateway: `myId`, `messages`, `message`, `getMessages`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat message as stored and broadcast by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendMessage {
    /// Server-assigned message identifier
    pub id: String,
    /// Identity of the author
    pub user_id: String,
    /// Message text
    pub message: String,
    /// When the server accepted the message
    pub created_at: DateTime<Utc>,
}

/// Identity pushed to a client right after it connects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityPayload {
    /// Connection identifier
    pub id: String,
    /// Display name resolved from the connection's credential
    pub user_name: String,
}

/// Body of an outbound chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub user_id: String,
    pub message: String,
}

/// Events sent from client to server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Ask for the history replay
    #[serde(rename = "getMessages")]
    GetMessages,
    /// Post a message to the room
    #[serde(rename = "message")]
    Message(OutgoingMessage),
}

/// Events sent from server to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Handshake acknowledgment carrying the session identity
    #[serde(rename = "myId")]
    Identity(IdentityPayload),
    /// History replay, oldest first
    #[serde(rename = "messages")]
    History(Vec<BackendMessage>),
    /// A live message
    #[serde(rename = "message")]
    Message(BackendMessage),
    /// Request-level error; the connection stays open
    #[serde(rename = "error")]
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_client_event_get_messages() {
        let json = serde_json::to_string(&ClientEvent::GetMessages).unwrap();
        assert_eq!(json, r#"{"event":"getMessages"}"#);
        let back: ClientEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ClientEvent::GetMessages);
    }

    #[test]
    fn test_client_event_message_deserialize() {
        let json = r#"{"event": "message", "data": {"userId": "u-1", "message": "hola"}}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        match event {
            ClientEvent::Message(body) => {
                assert_eq!(body.user_id, "u-1");
                assert_eq!(body.message, "hola");
            }
            _ => panic!("Expected Message"),
        }
    }

    #[test]
    fn test_server_event_identity_serialize() {
        let event = ServerEvent::Identity(IdentityPayload {
            id: "abc-123".to_string(),
            user_name: "Ana".to_string(),
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"myId\""));
        assert!(json.contains("\"userName\":\"Ana\""));
    }

    #[test]
    fn test_server_event_history_deserialize() {
        let json = r#"{
            "event": "messages",
            "data": [
                {"id": "1", "userId": "u-1", "message": "hola", "createdAt": "2025-03-01T09:01:00Z"},
                {"id": "2", "userId": "u-2", "message": "buenas", "createdAt": "2025-03-01T09:02:00Z"}
            ]
        }"#;
        let event: ServerEvent = serde_json::from_str(json).unwrap();
        match event {
            ServerEvent::History(messages) => {
                assert_eq!(messages.len(), 2);
                assert_eq!(messages[1].user_id, "u-2");
                assert_eq!(
                    messages[0].created_at,
                    Utc.with_ymd_and_hms(2025, 3, 1, 9, 1, 0).unwrap()
                );
            }
            _ => panic!("Expected History"),
        }
    }

    #[test]
    fn test_unknown_event_rejected() {
        let json = r#"{"event": "private_message", "data": {}}"#;
        assert!(serde_json::from_str::<ServerEvent>(json).is_err());
    }
}
