//! Bridge configuration loaded from environment.

use std::path::PathBuf;

/// How the channel proves identity to the push service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthTransport {
    /// Send an `authenticate` frame right after connecting (primary path).
    Handshake,
    /// Carry the bearer token on the connection request headers (legacy).
    Header,
}

/// Bridge configuration loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Push service WebSocket endpoint (e.g. `ws://127.0.0.1:3000/ws`).
    pub push_url: String,
    /// Mark-as-read HTTP endpoint (bearer-authenticated POST).
    pub mark_read_url: String,
    /// Directory holding the durable counter slot.
    pub state_dir: PathBuf,
    /// Identity proof transport: `handshake` (default) or `header`.
    pub auth_transport: AuthTransport,
    /// Notification feed cap; the oldest entries are evicted past this.
    pub max_feed: usize,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let push_url =
            std::env::var("PUSH_URL").unwrap_or_else(|_| "ws://127.0.0.1:3000/ws".to_string());
        url::Url::parse(&push_url).map_err(|_| ConfigLoadError::InvalidPushUrl)?;

        let mark_read_url = std::env::var("MARK_READ_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3000/api/notifications/read".to_string());
        url::Url::parse(&mark_read_url).map_err(|_| ConfigLoadError::InvalidMarkReadUrl)?;

        let state_dir = std::env::var("STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_state_dir());

        let auth_transport = match std::env::var("AUTH_TRANSPORT").as_deref() {
            Ok("header") => AuthTransport::Header,
            _ => AuthTransport::Handshake,
        };

        let max_feed = std::env::var("MAX_FEED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(200);

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            push_url,
            mark_read_url,
            state_dir,
            auth_transport,
            max_feed,
            log_level,
        })
    }
}

fn default_state_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("notibridge")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid PUSH_URL")]
    InvalidPushUrl,
    #[error("Invalid MARK_READ_URL")]
    InvalidMarkReadUrl,
}
