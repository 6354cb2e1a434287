//! Chat message log
//!
//! Pure state for one chat connection. The session actor is the only writer.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use super::error::ChatError;
use crate::websocket::{BackendMessage, IdentityPayload, OutgoingMessage};

/// Identity assigned by the server when the connection is acknowledged
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionIdentity {
    pub connection_id: String,
    pub display_name: String,
}

impl From<IdentityPayload> for SessionIdentity {
    fn from(payload: IdentityPayload) -> Self {
        Self {
            connection_id: payload.id,
            display_name: payload.user_name,
        }
    }
}

/// Who wrote a message, from this session's point of view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "id")]
pub enum MessageSender {
    Me,
    Peer(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Appended locally, not yet written to the socket
    Pending,
    /// Written to the socket
    Sent,
    /// The server broadcast it back
    Acknowledged,
    /// The socket write failed
    Failed,
    /// Arrived from the server
    Received,
}

impl DeliveryStatus {
    /// Local sends the server has not confirmed yet
    pub fn is_unconfirmed(self) -> bool {
        matches!(self, Self::Pending | Self::Sent | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: MessageSender,
    pub body: String,
    /// Local wall-clock `HH:MM`
    pub timestamp: String,
    pub status: DeliveryStatus,
}

/// A local send that has been appended and still has to be written
#[derive(Debug, Clone)]
pub struct PendingSend {
    pub local_id: String,
    pub outgoing: OutgoingMessage,
}

/// What an inbound message did to the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundOutcome {
    Appended(ChatMessage),
    /// Echo of one of our own sends
    Acknowledged(ChatMessage),
}

/// Ordered message log plus the identity it is interpreted against
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    identity: Option<SessionIdentity>,
    configured_user: Option<String>,
    next_local: u64,
}

impl ChatLog {
    /// Create an empty log. `configured_user`, when set, is the identity messages are sent
    /// under instead of the server-assigned connection id.
    pub fn new(configured_user: Option<String>) -> Self {
        Self {
            configured_user: configured_user.filter(|u| !u.trim().is_empty()),
            ..Self::default()
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn identity(&self) -> Option<&SessionIdentity> {
        self.identity.as_ref()
    }

    pub fn identify(&mut self, payload: IdentityPayload) -> SessionIdentity {
        let identity = SessionIdentity::from(payload);
        self.identity = Some(identity.clone());
        identity
    }

    /// Drop the connection identity; it belongs to a socket that no longer exists
    pub fn forget_identity(&mut self) {
        self.identity = None;
    }

    /// Identity used as `userId` on outbound messages
    pub fn sender_id(&self) -> Option<&str> {
        self.configured_user
            .as_deref()
            .or_else(|| self.identity.as_ref().map(|i| i.connection_id.as_str()))
            .filter(|id| !id.is_empty())
    }

    /// Append a local send as pending.
    ///
    /// Returns `Ok(None)` for a blank body; nothing is appended in that case.
    pub fn begin_send(&mut self, body: &str) -> Result<Option<PendingSend>, ChatError> {
        if body.trim().is_empty() {
            return Ok(None);
        }
        let user_id = self.sender_id().ok_or(ChatError::NotIdentified)?.to_string();

        self.next_local += 1;
        let local_id = format!("local-{}", self.next_local);
        self.messages.push(ChatMessage {
            id: local_id.clone(),
            sender: MessageSender::Me,
            body: body.to_string(),
            timestamp: display_time(Utc::now()),
            status: DeliveryStatus::Pending,
        });

        Ok(Some(PendingSend {
            local_id,
            outgoing: OutgoingMessage {
                user_id,
                message: body.to_string(),
            },
        }))
    }

    /// Move a local message to `status`. An acknowledged message keeps its status.
    pub fn set_status(&mut self, id: &str, status: DeliveryStatus) -> Option<ChatMessage> {
        let message = self.messages.iter_mut().find(|m| m.id == id)?;
        if message.status != DeliveryStatus::Acknowledged {
            message.status = status;
        }
        Some(message.clone())
    }

    pub fn get(&self, id: &str) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Apply a live message from the server
    pub fn apply_inbound(&mut self, incoming: BackendMessage) -> InboundOutcome {
        if self.is_own(&incoming.user_id) {
            let echo = self.messages.iter_mut().find(|m| {
                m.sender == MessageSender::Me
                    && matches!(m.status, DeliveryStatus::Pending | DeliveryStatus::Sent)
                    && m.body == incoming.message
            });
            if let Some(local) = echo {
                local.status = DeliveryStatus::Acknowledged;
                return InboundOutcome::Acknowledged(local.clone());
            }
        }

        let message = self.to_chat_message(incoming);
        self.messages.push(message.clone());
        InboundOutcome::Appended(message)
    }

    /// Replace confirmed entries with the server's history. Local sends that are still
    /// unconfirmed stay after the replayed messages.
    pub fn replace_history(&mut self, history: Vec<BackendMessage>) -> &[ChatMessage] {
        let unconfirmed: Vec<ChatMessage> = self
            .messages
            .drain(..)
            .filter(|m| m.sender == MessageSender::Me && m.status.is_unconfirmed())
            .collect();

        let mut replayed: Vec<ChatMessage> = history
            .into_iter()
            .map(|m| self.to_chat_message(m))
            .collect();
        replayed.extend(unconfirmed);
        self.messages = replayed;
        &self.messages
    }

    fn is_own(&self, user_id: &str) -> bool {
        self.sender_id() == Some(user_id)
    }

    fn to_chat_message(&self, incoming: BackendMessage) -> ChatMessage {
        let own = self.is_own(&incoming.user_id);
        ChatMessage {
            id: incoming.id,
            sender: if own {
                MessageSender::Me
            } else {
                MessageSender::Peer(incoming.user_id)
            },
            body: incoming.message,
            timestamp: display_time(incoming.created_at),
            status: if own {
                DeliveryStatus::Acknowledged
            } else {
                DeliveryStatus::Received
            },
        }
    }
}

fn display_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M").to_string()
}
