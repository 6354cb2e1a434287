//! Chat session
//!
//! One WebSocket connection owned by a background actor task. The handle talks to the
//! actor over a command channel; the actor is the only writer of the message log.

use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, Message},
    MaybeTlsStream, WebSocketStream,
};

use super::error::ChatError;
use super::log::{ChatLog, ChatMessage, DeliveryStatus, InboundOutcome, SessionIdentity};
use crate::config::ChatConfig;
use crate::websocket::{ClientEvent, ServerEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long `connect` waits for the server's identity frame
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

const COMMAND_CAPACITY: usize = 32;
const EVENT_CAPACITY: usize = 256;

/// Changes to the session state, broadcast to subscribers
#[derive(Debug, Clone)]
pub enum ChatEvent {
    Identified(SessionIdentity),
    /// The log after a history replay
    HistoryLoaded(Vec<ChatMessage>),
    Appended(ChatMessage),
    StatusChanged(ChatMessage),
    /// Error frame from the server; the connection stays open
    ServerError(String),
    Disconnected,
}

enum Command {
    Send {
        body: String,
        reply: oneshot::Sender<Result<Option<ChatMessage>, ChatError>>,
    },
    Messages {
        reply: oneshot::Sender<Vec<ChatMessage>>,
    },
    Identity {
        reply: oneshot::Sender<Option<SessionIdentity>>,
    },
    Close {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to a live chat connection.
///
/// Dropping the handle stops the actor and closes the socket.
pub struct ChatSession {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<ChatEvent>,
    /// Receiver created before the actor started, so nothing it emits is missed
    first_events: Option<broadcast::Receiver<ChatEvent>>,
    task: JoinHandle<()>,
}

impl ChatSession {
    /// Open the connection, wait for the identity frame, and ask for the history replay.
    pub async fn connect(config: &ChatConfig, token: Option<&str>) -> Result<Self, ChatError> {
        let url = chat_url(&config.url, token)?;
        tracing::info!(url = %config.url, authenticated = token.is_some(), "Connecting to chat server");

        let (ws, _) = connect_async(url.as_str())
            .await
            .map_err(ChatError::Connect)?;
        let (mut sink, mut stream) = ws.split();
        let (events, first_events) = broadcast::channel(EVENT_CAPACITY);
        let mut log = ChatLog::new(config.user_id.clone());

        tokio::time::timeout(HANDSHAKE_TIMEOUT, await_identity(&mut stream, &mut log, &events))
            .await
            .map_err(|_| ChatError::HandshakeTimeout)??;

        let request = serde_json::to_string(&ClientEvent::GetMessages)?;
        sink.send(Message::Text(request))
            .await
            .map_err(ChatError::Transport)?;

        if let Some(identity) = log.identity() {
            tracing::info!(
                connection_id = %identity.connection_id,
                display_name = %identity.display_name,
                "Chat session established"
            );
        }

        let (commands, receiver) = mpsc::channel(COMMAND_CAPACITY);
        let actor = SessionActor {
            log,
            sink,
            stream,
            events: events.clone(),
            connected: true,
        };
        let task = tokio::spawn(actor.run(receiver));

        Ok(Self {
            commands,
            events,
            first_events: Some(first_events),
            task,
        })
    }

    /// Subscribe to session events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    /// Every event since the handshake, including the history replay.
    ///
    /// The first call gets the receiver that existed before the actor started; later
    /// calls fall back to [`subscribe`](Self::subscribe).
    pub fn events(&mut self) -> broadcast::Receiver<ChatEvent> {
        self.first_events
            .take()
            .unwrap_or_else(|| self.events.subscribe())
    }

    /// Append `body` optimistically and write it to the socket.
    ///
    /// A blank body is a no-op and yields `Ok(None)`.
    pub async fn send(&self, body: impl Into<String>) -> Result<Option<ChatMessage>, ChatError> {
        let body = body.into();
        self.request(|reply| Command::Send { body, reply }).await?
    }

    /// Snapshot of the message log in display order
    pub async fn messages(&self) -> Result<Vec<ChatMessage>, ChatError> {
        self.request(|reply| Command::Messages { reply }).await
    }

    pub async fn identity(&self) -> Result<Option<SessionIdentity>, ChatError> {
        self.request(|reply| Command::Identity { reply }).await
    }

    /// Close the socket and stop the actor
    pub async fn close(self) -> Result<(), ChatError> {
        self.request(|reply| Command::Close { reply }).await?;
        let _ = self.task.await;
        Ok(())
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ChatError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| ChatError::Closed)?;
        response.await.map_err(|_| ChatError::Closed)
    }
}

/// Append the bearer token to the chat URL as the `token` query parameter
///
/// A base without a path gets `/` so the request line stays valid.
pub fn chat_url(base: &str, token: Option<&str>) -> Result<String, ChatError> {
    let scheme_len = if base.starts_with("ws://") {
        "ws://".len()
    } else if base.starts_with("wss://") {
        "wss://".len()
    } else {
        return Err(ChatError::InvalidUrl(base.to_string()));
    };

    let rest = &base[scheme_len..];
    let authority_len = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    if authority_len == 0 {
        return Err(ChatError::InvalidUrl(base.to_string()));
    }

    let mut url = base.to_string();
    if !rest[authority_len..].starts_with('/') {
        url.insert(scheme_len + authority_len, '/');
    }

    if let Some(token) = token.filter(|t| !t.is_empty()) {
        let separator = if url.contains('?') { '&' } else { '?' };
        url.push(separator);
        url.push_str("token=");
        url.push_str(&urlencoding::encode(token));
    }
    Ok(url)
}

/// Read frames until the server pushes the connection identity
async fn await_identity(
    stream: &mut SplitStream<WsStream>,
    log: &mut ChatLog,
    events: &broadcast::Sender<ChatEvent>,
) -> Result<(), ChatError> {
    while let Some(frame) = stream.next().await {
        match frame.map_err(ChatError::Connect)? {
            Message::Text(text) => {
                if let Some(event) = decode(&text) {
                    let identified = matches!(event, ServerEvent::Identity(_));
                    apply_event(log, event, events);
                    if identified {
                        return Ok(());
                    }
                }
            }
            Message::Close(_) => return Err(ChatError::Disconnected),
            _ => {}
        }
    }
    Err(ChatError::Disconnected)
}

fn decode(text: &str) -> Option<ServerEvent> {
    match serde_json::from_str(text) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring unrecognised chat frame");
            None
        }
    }
}

fn apply_event(log: &mut ChatLog, event: ServerEvent, events: &broadcast::Sender<ChatEvent>) {
    let change = match event {
        ServerEvent::Identity(payload) => ChatEvent::Identified(log.identify(payload)),
        ServerEvent::History(history) => {
            tracing::debug!(count = history.len(), "Chat history replayed");
            ChatEvent::HistoryLoaded(log.replace_history(history).to_vec())
        }
        ServerEvent::Message(message) => match log.apply_inbound(message) {
            InboundOutcome::Appended(m) => ChatEvent::Appended(m),
            InboundOutcome::Acknowledged(m) => ChatEvent::StatusChanged(m),
        },
        ServerEvent::Error { message } => {
            tracing::warn!(error = %message, "Chat server reported an error");
            ChatEvent::ServerError(message)
        }
    };
    // No subscribers is fine
    let _ = events.send(change);
}

struct SessionActor {
    log: ChatLog,
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
    events: broadcast::Sender<ChatEvent>,
    connected: bool,
}

impl SessionActor {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Close { reply }) => {
                        self.shutdown().await;
                        let _ = reply.send(());
                        return;
                    }
                    Some(command) => self.handle_command(command).await,
                    None => {
                        self.shutdown().await;
                        return;
                    }
                },
                frame = self.stream.next(), if self.connected => self.handle_frame(frame),
            }
        }
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Send { body, reply } => {
                let result = self.send(body).await;
                let _ = reply.send(result);
            }
            Command::Messages { reply } => {
                let _ = reply.send(self.log.messages().to_vec());
            }
            Command::Identity { reply } => {
                let _ = reply.send(self.log.identity().cloned());
            }
            Command::Close { reply } => {
                let _ = reply.send(());
            }
        }
    }

    async fn send(&mut self, body: String) -> Result<Option<ChatMessage>, ChatError> {
        if body.trim().is_empty() {
            return Ok(None);
        }
        if !self.connected {
            return Err(ChatError::Disconnected);
        }
        let Some(pending) = self.log.begin_send(&body)? else {
            return Ok(None);
        };
        if let Some(message) = self.log.get(&pending.local_id) {
            let _ = self.events.send(ChatEvent::Appended(message.clone()));
        }

        let written = match serde_json::to_string(&ClientEvent::Message(pending.outgoing)) {
            Ok(text) => self
                .sink
                .send(Message::Text(text))
                .await
                .map_err(ChatError::Transport),
            Err(e) => Err(ChatError::Encode(e)),
        };

        let status = if written.is_ok() {
            DeliveryStatus::Sent
        } else {
            DeliveryStatus::Failed
        };
        let updated = self.log.set_status(&pending.local_id, status);
        if let Some(message) = &updated {
            let _ = self.events.send(ChatEvent::StatusChanged(message.clone()));
        }

        match written {
            Ok(()) => Ok(updated),
            Err(e) => {
                tracing::warn!(error = %e, "Chat send failed");
                if matches!(e, ChatError::Transport(_)) {
                    self.mark_disconnected();
                }
                Err(e)
            }
        }
    }

    fn handle_frame(&mut self, frame: Option<Result<Message, tungstenite::Error>>) {
        match frame {
            Some(Ok(Message::Text(text))) => {
                if let Some(event) = decode(&text) {
                    apply_event(&mut self.log, event, &self.events);
                }
            }
            Some(Ok(Message::Close(_))) | None => self.mark_disconnected(),
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                tracing::debug!(error = %e, "Chat receive error");
                self.mark_disconnected();
            }
        }
    }

    fn mark_disconnected(&mut self) {
        if self.connected {
            self.connected = false;
            self.log.forget_identity();
            tracing::info!("Chat connection closed by server");
            let _ = self.events.send(ChatEvent::Disconnected);
        }
    }

    async fn shutdown(&mut self) {
        if self.connected {
            self.connected = false;
            if let Err(e) = self.sink.close().await {
                tracing::debug!(error = %e, "Error closing chat socket");
            }
        }
        tracing::debug!("Chat session stopped");
    }
}
