//! Token sources behind the chat endpoint.

use std::pin::Pin;
use std::time::Duration;

use futures_util::stream::{self, Stream, StreamExt};
use grokchat_core::WireMessage;
use thiserror::Error;
use tracing::debug;

/// Tokens of one reply, in order.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, ModelError>> + Send>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The model failed while producing the reply.
    #[error("{0}")]
    Upstream(String),
}

/// Produces a reply for a conversation, one token at a time.
pub trait TokenSource: Send + Sync {
    fn stream_tokens(&self, messages: &[WireMessage], system_prompt: Option<&str>) -> TokenStream;
}

/// Replays a fixed reply word by word, pausing before each word.
#[derive(Debug, Clone)]
pub struct PlaceholderModel {
    reply: String,
    delay: Duration,
}

impl PlaceholderModel {
    pub fn new(reply: impl Into<String>, delay: Duration) -> Self {
        Self {
            reply: reply.into(),
            delay,
        }
    }
}

impl TokenSource for PlaceholderModel {
    fn stream_tokens(&self, messages: &[WireMessage], system_prompt: Option<&str>) -> TokenStream {
        debug!(
            messages = messages.len(),
            system_prompt = system_prompt.is_some(),
            "Placeholder reply"
        );

        let tokens: Vec<String> = self.reply.split_whitespace().map(str::to_string).collect();
        let delay = self.delay;
        Box::pin(stream::iter(tokens).then(move |token| async move {
            tokio::time::sleep(delay).await;
            Ok(token)
        }))
    }
}
