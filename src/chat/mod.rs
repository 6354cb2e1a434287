//! Chat Client
//!
//! Client side of the realtime chat channel.
//!
//! - **log**: Message log, identity, echo acknowledgment and history replay
//! - **session**: WebSocket connection driven by a single actor task
//!
//! ```rust,ignore
//! let session = ChatSession::connect(&config.chat, token.as_deref()).await?;
//! let mut events = session.subscribe();
//! session.send("hola").await?;
//! ```

mod error;
mod log;
mod session;

pub use error::ChatError;
pub use log::{
    ChatLog, ChatMessage, DeliveryStatus, InboundOutcome, MessageSender, PendingSend,
    SessionIdentity,
};
pub use session::{chat_url, ChatEvent, ChatSession};
