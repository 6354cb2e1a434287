//! Application State
//!
//! Shared state accessible by all API handlers.
//! Everything lives in process memory; restarting the server forgets it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::dto::RegisterUserRequest;
use crate::schedule::TimeslotRequest;
use crate::websocket::{ChatHub, HubConfig};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// Chat connections and history
    pub chat_hub: Arc<ChatHub>,
    timeslots: Arc<RwLock<Vec<StoredTimeslot>>>,
    /// Registered users keyed by lowercase email
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
    /// Issued bearer tokens → user email
    tokens: Arc<RwLock<HashMap<String, String>>>,
}

/// A timeslot accepted by `POST /timeslots`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTimeslot {
    pub id: String,
    #[serde(flatten)]
    pub request: TimeslotRequest,
    pub created_at: DateTime<Utc>,
}

/// A registered user
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub user_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl UserRecord {
    /// Name shown in the chat
    pub fn display_name(&self) -> String {
        format!("{} {}", self.user_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl AppState {
    pub fn new(config: ApiConfig) -> Self {
        let hub_config = HubConfig {
            max_connections: config.max_connections,
            history_limit: config.history_limit,
        };
        Self {
            config: Arc::new(config),
            start_time: Instant::now(),
            chat_hub: Arc::new(ChatHub::new(hub_config)),
            timeslots: Arc::new(RwLock::new(Vec::new())),
            users: Arc::new(RwLock::new(HashMap::new())),
            tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub async fn add_timeslot(&self, request: TimeslotRequest) -> StoredTimeslot {
        let stored = StoredTimeslot {
            id: Uuid::new_v4().to_string(),
            request,
            created_at: Utc::now(),
        };
        self.timeslots.write().await.push(stored.clone());
        stored
    }

    /// All stored timeslots in insertion order
    pub async fn timeslots(&self) -> Vec<StoredTimeslot> {
        self.timeslots.read().await.clone()
    }

    /// Store a new user. Returns `None` if the email is already registered.
    pub async fn insert_user(&self, request: RegisterUserRequest) -> Option<UserRecord> {
        let key = request.email.trim().to_lowercase();
        let mut users = self.users.write().await;
        if users.contains_key(&key) {
            return None;
        }
        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            user_name: request.user_name,
            last_name: request.last_name,
            email: key.clone(),
            password: request.password,
            role: request.role,
        };
        users.insert(key, record.clone());
        Some(record)
    }

    /// Check credentials and issue a fresh bearer token
    pub async fn authenticate(&self, email: &str, password: &str) -> Option<(String, UserRecord)> {
        let key = email.trim().to_lowercase();
        let user = self.users.read().await.get(&key).cloned()?;
        if user.password != password {
            return None;
        }
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.write().await.insert(token.clone(), key);
        Some((token, user))
    }

    /// Resolve a bearer token issued by `authenticate`
    pub async fn user_for_token(&self, token: &str) -> Option<UserRecord> {
        let email = self.tokens.read().await.get(token).cloned()?;
        self.users.read().await.get(&email).cloned()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Get chat connection count
    pub async fn chat_connection_count(&self) -> usize {
        self.chat_hub.connection_count().await
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Messages kept for chat history replay
    pub history_limit: usize,
    /// Maximum concurrent chat connections
    pub max_connections: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            history_limit: 200,
            max_connections: 1000,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&crate::config::ServerConfig> for ApiConfig {
    fn from(server: &crate::config::ServerConfig) -> Self {
        Self {
            host: server.host.clone(),
            port: server.port,
            history_limit: server.history_limit,
            max_connections: server.max_connections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Weekday;

    fn register(email: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            user_name: "Ana".to_string(),
            last_name: "Pérez".to_string(),
            phone: "555-123-4567".to_string(),
            email: email.to_string(),
            password: "secreto".to_string(),
            age: 30,
            address: "Calle 1".to_string(),
            role: "profesor".to_string(),
        }
    }

    #[test]
    fn test_api_config_addr() {
        let config = ApiConfig::new("0.0.0.0", 8080);
        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert_eq!(ApiConfig::default().addr(), "127.0.0.1:3000");
    }

    #[tokio::test]
    async fn test_timeslots_keep_insertion_order() {
        let state = AppState::new(ApiConfig::default());
        for day in [Weekday::Viernes, Weekday::Lunes] {
            state
                .add_timeslot(TimeslotRequest {
                    day_of_week: day,
                    start_time: "08:00".parse().unwrap(),
                    end_time: "09:00".parse().unwrap(),
                })
                .await;
        }
        let days: Vec<_> = state
            .timeslots()
            .await
            .into_iter()
            .map(|s| s.request.day_of_week)
            .collect();
        assert_eq!(days, vec![Weekday::Viernes, Weekday::Lunes]);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let state = AppState::new(ApiConfig::default());
        assert!(state.insert_user(register("ana@example.com")).await.is_some());
        assert!(state.insert_user(register("ANA@example.com")).await.is_none());
        assert_eq!(state.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_token_resolves_user() {
        let state = AppState::new(ApiConfig::default());
        state.insert_user(register("ana@example.com")).await;

        assert!(state.authenticate("ana@example.com", "otra").await.is_none());
        let (token, _) = state
            .authenticate("ana@example.com", "secreto")
            .await
            .unwrap();

        let user = state.user_for_token(&token).await.unwrap();
        assert_eq!(user.display_name(), "Ana Pérez");
        assert!(state.user_for_token("nope").await.is_none());
    }
}
