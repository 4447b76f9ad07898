//! Core domain errors.

use thiserror::Error;

/// Violations of the conversation invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Message text was empty after trimming.
    #[error("Message is empty")]
    EmptyMessage,

    /// A turn is already outstanding.
    #[error("A reply is still streaming")]
    TurnInProgress,

    /// No assistant message is currently being streamed.
    #[error("No assistant reply in progress")]
    NoActiveTurn,
}

/// Errors that end a chat turn. All of them are shown to the user and none
/// are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    /// Non-success HTTP status, or a response without a body.
    #[error("Chat API error: {status}")]
    Transport { status: u16 },

    /// The server sent an `[ERROR]` payload.
    #[error("{0}")]
    Stream(String),

    /// The byte stream ended before the completion sentinel.
    #[error("Connection closed before the reply completed")]
    ClosedEarly,

    /// Anything else that went wrong while sending or decoding.
    #[error("{0}")]
    Unknown(String),
}

impl TurnError {
    /// Build an `Unknown` error, falling back to a generic message.
    pub fn unknown(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self::Unknown("Unknown error".to_string())
        } else {
            Self::Unknown(message)
        }
    }

    /// Build a `Stream` error from the server's detail text.
    ///
    /// A blank detail carries nothing to show, so it becomes the generic
    /// unknown error instead.
    pub fn stream(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        if detail.trim().is_empty() {
            Self::unknown(detail)
        } else {
            Self::Stream(detail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_message() {
        let err = TurnError::Transport { status: 500 };
        assert_eq!(err.to_string(), "Chat API error: 500");
    }

    #[test]
    fn test_unknown_fallback() {
        assert_eq!(TurnError::unknown("").to_string(), "Unknown error");
        assert_eq!(TurnError::unknown("boom").to_string(), "boom");
    }

    #[test]
    fn test_blank_stream_detail_is_unknown() {
        assert_eq!(TurnError::stream("disk full"), TurnError::Stream("disk full".into()));
        assert_eq!(TurnError::stream("  ").to_string(), "Unknown error");
    }
}
