//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote HTTP API the clients talk to
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Chat connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_chat_url")]
    pub url: String,

    /// Identity to send messages as; the server-assigned id is used when unset
    #[serde(default)]
    pub user_id: Option<String>,
}

fn default_chat_url() -> String {
    "ws://localhost:3000/ws".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            url: default_chat_url(),
            user_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Token file; `<config_dir>/agenda/token` when unset
    #[serde(default)]
    pub token_path: Option<PathBuf>,
}

/// Local backend (`agenda-server`) settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_history_limit() -> usize {
    200
}

fn default_max_connections() -> usize {
    1000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            history_limit: default_history_limit(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub fn directive(&self) -> String {
        format!("agenda={},tower_http={}", self.level, self.level)
    }

    /// Install the global tracing subscriber
    pub fn init(&self) -> Result<(), ConfigError> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directive()));
        let registry = tracing_subscriber::registry().with(filter);

        let result = if self.format.eq_ignore_ascii_case("json") {
            registry.with(tracing_subscriber::fmt::layer().json()).try_init()
        } else {
            registry.with(tracing_subscriber::fmt::layer()).try_init()
        };
        result.map_err(|e| ConfigError::Logging(e.to_string()))
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("agenda").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("AGENDA_API_URL") {
            self.api.base_url = url;
        }

        if let Some(url) = lookup("AGENDA_CHAT_URL") {
            self.chat.url = url;
        }
        if let Some(user) = lookup("AGENDA_CHAT_USER") {
            self.chat.user_id = Some(user).filter(|u| !u.is_empty());
        }

        if let Some(path) = lookup("AGENDA_TOKEN_PATH") {
            self.auth.token_path = Some(PathBuf::from(path));
        }

        if let Some(host) = lookup("AGENDA_SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("AGENDA_SERVER_PORT") {
            match port.parse() {
                Ok(p) => self.server.port = p,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid AGENDA_SERVER_PORT"),
            }
        }

        if let Some(level) = lookup("AGENDA_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("AGENDA_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Agenda Configuration
#
# Environment variables override these settings:
# - AGENDA_API_URL
# - AGENDA_CHAT_URL
# - AGENDA_CHAT_USER
# - AGENDA_TOKEN_PATH
# - AGENDA_SERVER_HOST
# - AGENDA_SERVER_PORT
# - AGENDA_LOG_LEVEL
# - AGENDA_LOG_FORMAT

[api]
# Backend serving /auth, /user and /timeslots
base_url = "http://localhost:3000"

# Request timeout in seconds
request_timeout_secs = 30

[chat]
# Chat WebSocket endpoint; the stored token is appended as ?token=
url = "ws://localhost:3000/ws"

# Send messages under this identity instead of the server-assigned one
# user_id = "profe-7"

[auth]
# Where the login token is kept (default: <config_dir>/agenda/token)
# token_path = "/home/me/.config/agenda/token"

[server]
# Local backend (agenda-server)
host = "127.0.0.1"
port = 3000

# Chat messages kept for history replay
history_limit = 200

# Maximum concurrent chat connections
max_connections = 1000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert_eq!(config.api.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.chat.url, "ws://localhost:3000/ws");
        assert!(config.chat.user_id.is_none());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.api.base_url, default_base_url());
        assert_eq!(config.chat.url, default_chat_url());
        assert_eq!(config.server.history_limit, 200);
        assert!(config.auth.token_path.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[chat]\nuser_id = \"profe-7\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.chat.user_id.as_deref(), Some("profe-7"));
        assert_eq!(config.chat.url, "ws://localhost:3000/ws");
        assert_eq!(config.server.max_connections, 1000);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            Config::load(&missing),
            Err(ConfigError::Io { .. })
        ));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[server]\nport = \"many\"\n").unwrap();
        assert!(matches!(Config::load(&bad), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("AGENDA_API_URL", "http://api:8080"),
            ("AGENDA_CHAT_USER", "u-9"),
            ("AGENDA_SERVER_PORT", "4000"),
            ("AGENDA_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "http://api:8080");
        assert_eq!(config.chat.user_id.as_deref(), Some("u-9"));
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.chat.url, default_chat_url());
    }

    #[test]
    fn test_invalid_port_override_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "AGENDA_SERVER_PORT").then(|| "x".to_string()));
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_log_directive() {
        let logging = LoggingConfig {
            level: "debug".to_string(),
            format: "json".to_string(),
        };
        assert_eq!(logging.directive(), "agenda=debug,tower_http=debug");
    }
}
