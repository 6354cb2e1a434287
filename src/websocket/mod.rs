//! WebSocket Chat Channel
//!
//! Server side of the chat transport and the wire protocol shared with the client.
//!
//! ## Architecture
//!
//! - **Messages**: Client and server event formats
//! - **ChatHub**: Connections, bounded history, and broadcast
//! - **Handler**: WebSocket upgrade and per-connection tasks
//!
//! ## Protocol
//!
//! Clients connect to `/ws?token=<bearer>`. The server answers with `myId`; the client
//! asks for `getMessages` and receives the `messages` replay, then live `message`
//! events. Posting is `{"event": "message", "data": {"userId": ..., "message": ...}}`.

mod handler;
mod hub;
mod messages;

pub use handler::{websocket_handler, ConnectParams};
pub use hub::{ChatHub, ConnectionId, HubConfig, HubError};
pub use messages::{BackendMessage, ClientEvent, IdentityPayload, OutgoingMessage, ServerEvent};
