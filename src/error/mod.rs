//! Bridge error types for robust error handling.

use thiserror::Error;

/// Bridge-level errors. Transport failures are values the caller can act
/// on; nothing here is ever thrown into a consumer-facing accessor.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Channel error: {0}")]
    Channel(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),
}

pub type BridgeResult<T> = Result<T, BridgeError>;
