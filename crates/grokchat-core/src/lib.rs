//! grokchat Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - Terminal rendering
//! - Runtime specifics
//!
//! Everything the chat client knows about a conversation lives here: the
//! messages, the single in-progress assistant turn, the session identifier
//! and the errors a turn can end with.

pub mod chat;
pub mod conversation;
pub mod error;
pub mod ids;

// Re-export commonly used types
pub use chat::{ChatMessage, ChatRole, WireMessage};
pub use conversation::{Conversation, TurnEvent};
pub use error::{CoreError, TurnError};
pub use ids::{IdGenerator, SessionId};
