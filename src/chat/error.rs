use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Invalid chat URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to connect to chat server: {0}")]
    Connect(#[source] tungstenite::Error),

    #[error("Chat server did not acknowledge the connection")]
    HandshakeTimeout,

    #[error("No chat identity yet; wait for the server acknowledgment")]
    NotIdentified,

    #[error("Chat connection is closed")]
    Disconnected,

    #[error("Chat session has been shut down")]
    Closed,

    #[error("Failed to write to chat connection: {0}")]
    Transport(#[source] tungstenite::Error),

    #[error("Failed to encode chat event: {0}")]
    Encode(#[from] serde_json::Error),
}
