//! Chat Hub
//!
//! Tracks connected chat clients, the bounded message history, and fans every posted
//! message out to all connections (the author included).

use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::messages::{BackendMessage, IdentityPayload, OutgoingMessage, ServerEvent};

/// Unique identifier for a WebSocket connection
pub type ConnectionId = String;

/// Manages chat connections and history
pub struct ChatHub {
    /// Active connections: ConnectionId → ConnectionHandle
    connections: RwLock<HashMap<ConnectionId, ConnectionHandle>>,
    /// Most recent messages, oldest first
    history: RwLock<VecDeque<BackendMessage>>,
    config: HubConfig,
}

/// Configuration for the chat hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent connections
    pub max_connections: usize,
    /// Number of messages kept for history replay
    pub history_limit: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: 1000,
            history_limit: 200,
        }
    }
}

/// Handle for sending events to a specific connection
pub struct ConnectionHandle {
    pub sender: mpsc::UnboundedSender<ServerEvent>,
    pub user_name: String,
}

impl ChatHub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            history: RwLock::new(VecDeque::new()),
            config,
        }
    }

    /// Register a new connection and return the identity assigned to it
    pub async fn register(
        &self,
        sender: mpsc::UnboundedSender<ServerEvent>,
        user_name: impl Into<String>,
    ) -> Result<IdentityPayload, HubError> {
        let mut connections = self.connections.write().await;
        if connections.len() >= self.config.max_connections {
            return Err(HubError::TooManyConnections(self.config.max_connections));
        }

        let id = Uuid::new_v4().to_string();
        let user_name = user_name.into();
        connections.insert(
            id.clone(),
            ConnectionHandle {
                sender,
                user_name: user_name.clone(),
            },
        );

        tracing::info!(connection_id = %id, user_name = %user_name, "Chat client connected");
        Ok(IdentityPayload { id, user_name })
    }

    /// Drop a connection; returns the name it was registered under
    pub async fn unregister(&self, id: &str) -> Option<String> {
        let handle = self.connections.write().await.remove(id)?;
        tracing::info!(connection_id = %id, user_name = %handle.user_name, "Chat client disconnected");
        Some(handle.user_name)
    }

    /// Snapshot of the stored history, oldest first
    pub async fn history(&self) -> Vec<BackendMessage> {
        self.history.read().await.iter().cloned().collect()
    }

    /// Accept a message, append it to history, and broadcast it to every connection
    pub async fn post(&self, outgoing: OutgoingMessage) -> Result<BackendMessage, HubError> {
        if outgoing.message.trim().is_empty() {
            return Err(HubError::EmptyMessage);
        }
        if outgoing.user_id.trim().is_empty() {
            return Err(HubError::MissingAuthor);
        }

        let message = BackendMessage {
            id: Uuid::new_v4().to_string(),
            user_id: outgoing.user_id,
            message: outgoing.message,
            created_at: Utc::now(),
        };

        {
            let mut history = self.history.write().await;
            history.push_back(message.clone());
            while history.len() > self.config.history_limit {
                history.pop_front();
            }
        }

        self.broadcast(ServerEvent::Message(message.clone())).await;
        Ok(message)
    }

    /// Send an event to every connection
    pub async fn broadcast(&self, event: ServerEvent) {
        let connections = self.connections.read().await;
        let mut sent_count = 0;
        for handle in connections.values() {
            if handle.sender.send(event.clone()).is_ok() {
                sent_count += 1;
            }
        }
        tracing::trace!(subscribers = sent_count, "Broadcast chat event");
    }

    /// Send an event to one connection
    pub async fn send_to(&self, id: &str, event: ServerEvent) -> Result<(), HubError> {
        let connections = self.connections.read().await;
        let handle = connections.get(id).ok_or(HubError::ConnectionNotFound)?;
        handle.sender.send(event).map_err(|_| HubError::SendFailed)
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

/// Errors that can occur in the chat hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many connections (limit: {0})")]
    TooManyConnections(usize),

    #[error("Connection not found")]
    ConnectionNotFound,

    #[error("Failed to send message")]
    SendFailed,

    #[error("Message body is empty")]
    EmptyMessage,

    #[error("Message has no author")]
    MissingAuthor,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outgoing(user: &str, text: &str) -> OutgoingMessage {
        OutgoingMessage {
            user_id: user.to_string(),
            message: text.to_string(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = HubConfig::default();
        assert_eq!(config.max_connections, 1000);
        assert_eq!(config.history_limit, 200);
    }

    #[tokio::test]
    async fn test_register_unregister() {
        let hub = ChatHub::new(HubConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();

        let identity = hub.register(tx, "Ana").await.unwrap();
        assert!(!identity.id.is_empty());
        assert_eq!(identity.user_name, "Ana");
        assert_eq!(hub.connection_count().await, 1);

        assert_eq!(hub.unregister(&identity.id).await.as_deref(), Some("Ana"));
        assert_eq!(hub.connection_count().await, 0);
        assert_eq!(hub.unregister(&identity.id).await, None);
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let hub = ChatHub::new(HubConfig {
            max_connections: 1,
            history_limit: 10,
        });
        let (tx1, _) = mpsc::unbounded_channel();
        let (tx2, _) = mpsc::unbounded_channel();

        hub.register(tx1, "a").await.unwrap();
        let result = hub.register(tx2, "b").await;
        assert!(matches!(result, Err(HubError::TooManyConnections(1))));
    }

    #[tokio::test]
    async fn test_post_broadcasts_to_everyone() {
        let hub = ChatHub::new(HubConfig::default());
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        hub.register(tx1, "a").await.unwrap();
        hub.register(tx2, "b").await.unwrap();

        let posted = hub.post(outgoing("u-1", "hola")).await.unwrap();

        for rx in [&mut rx1, &mut rx2] {
            match rx.try_recv().unwrap() {
                ServerEvent::Message(m) => assert_eq!(m, posted),
                other => panic!("Expected Message, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let hub = ChatHub::new(HubConfig {
            max_connections: 10,
            history_limit: 2,
        });
        for text in ["uno", "dos", "tres"] {
            hub.post(outgoing("u-1", text)).await.unwrap();
        }

        let history: Vec<_> = hub.history().await.into_iter().map(|m| m.message).collect();
        assert_eq!(history, vec!["dos", "tres"]);
    }

    #[tokio::test]
    async fn test_post_rejects_empty() {
        let hub = ChatHub::new(HubConfig::default());
        assert!(matches!(
            hub.post(outgoing("u-1", "   ")).await,
            Err(HubError::EmptyMessage)
        ));
        assert!(matches!(
            hub.post(outgoing("", "hola")).await,
            Err(HubError::MissingAuthor)
        ));
        assert!(hub.history().await.is_empty());
    }
}
