//! Error types for the chat client.

use grokchat_core::TurnError;
use thiserror::Error;

/// Errors that can occur while talking to the chat backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP error from reqwest (connect, body read, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status, or a response with no body.
    #[error("Chat API error: {0}")]
    Status(u16),

    /// Local storage I/O failure.
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage file does not hold a JSON object.
    #[error("invalid storage file: {0}")]
    InvalidStore(String),
}

impl From<ClientError> for TurnError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Status(status) => TurnError::Transport { status },
            other => TurnError::unknown(other.to_string()),
        }
    }
}
