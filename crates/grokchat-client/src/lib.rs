//! Streaming chat client for grokchat.
//!
//! Sends the conversation to the backend's `/api/chat` endpoint and decodes
//! the server-sent-event reply into turn events.
//!
//! # Example
//!
//! ```rust,no_run
//! use grokchat_client::{ChatClient, ClientConfig, HttpTransport, IdentityStore};
//! use grokchat_core::{Conversation, TurnEvent};
//!
//! async fn ask() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::default();
//!     let session_id = IdentityStore::open(&config).get_or_create_session_id();
//!     let client = ChatClient::new(HttpTransport::new(&config.api_base), Some(session_id));
//!
//!     let mut conversation = Conversation::new();
//!     conversation.append_user_message("hi")?;
//!     client
//!         .stream_turn(conversation.wire_messages(), |event: TurnEvent| {
//!             let _ = conversation.apply(event);
//!         })
//!         .await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod decoder;
pub mod error;
pub mod identity;
pub mod session;
pub mod transport;

pub use config::ClientConfig;
pub use decoder::{decode_stream, EventReader, SseDecoder, StreamEvent};
pub use error::ClientError;
pub use identity::{FileStore, IdentityStore, KeyValueStore, MemoryStore};
pub use session::{ChatClient, TurnOutcome};
pub use transport::{ByteStream, ChatTransport, HttpTransport};
