//! # Agenda
//!
//! Client and local backend for a scheduling dashboard: weekly availability editing,
//! user registration and login, and a realtime chat.
//!
//! ## Modules
//!
//! - [`schedule`]: Time dial, availability editor, validation and bulk commit
//! - [`chat`]: Chat session over a WebSocket with an ordered message log
//! - [`auth`]: Login and registration clients, bearer token storage
//! - [`websocket`]: Chat wire protocol and the server-side hub
//! - [`api`]: In-memory HTTP backend with Axum
//! - [`config`]: TOML configuration and logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use agenda::schedule::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut editor = AvailabilityEditor::new();
//!     editor.toggle_day(Weekday::Miercoles);
//!
//!     let dial = editor.open_dial(Weekday::Miercoles, 0, IntervalField::From)?;
//!     editor.close_dial(dial.accept())?;
//!     editor.set_time(Weekday::Miercoles, 0, IntervalField::To, "13:30".parse()?)?;
//!
//!     let store = HttpTimeslotStore::new("http://localhost:3000", Duration::from_secs(30))?;
//!     match editor.commit_all(&store).await {
//!         Ok(report) => println!("{}", report.notification()),
//!         Err(e) => println!("{}", e.notification()),
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod chat;
pub mod config;
pub mod schedule;
pub mod websocket;

// Re-export top-level types for convenience
pub use schedule::{
    AvailabilityEditor, DialOutcome, Interval, IntervalField, ScheduleError, TimeDial,
    TimeOfDay, TimeslotRequest, TimeslotStore, Weekday,
};

pub use chat::{ChatError, ChatEvent, ChatMessage, ChatSession, DeliveryStatus, MessageSender};

pub use auth::{AuthClient, AuthError, TokenStore, UserRegistration};

pub use api::{build_router, serve, ApiError, AppState};

pub use websocket::{ChatHub, ClientEvent, HubConfig, HubError, ServerEvent, websocket_handler};

pub use config::{Config, ConfigError, LoggingConfig};
