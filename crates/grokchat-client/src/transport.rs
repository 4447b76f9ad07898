//! HTTP transport for the chat endpoint.

use std::pin::Pin;

use async_trait::async_trait;
use grokchat_core::{SessionId, WireMessage};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Serialize;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::config::chat_url;
use crate::error::ClientError;

/// Live response body, one item per received chunk.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, ClientError>> + Send>>;

/// Sends a conversation and hands back the streamed reply.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send the full history in one request.
    ///
    /// Fails with `ClientError::Status` when the response is not a success
    /// or has no body. The body is returned unbuffered.
    async fn send_conversation(
        &self,
        messages: &[WireMessage],
        session_id: Option<&SessionId>,
    ) -> Result<ByteStream, ClientError>;
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [WireMessage],
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
}

/// `ChatTransport` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: reqwest::Client,
    url: String,
}

impl HttpTransport {
    /// Create a transport for the backend at `api_base`.
    pub fn new(api_base: &str) -> Self {
        Self {
            inner: reqwest::Client::new(),
            url: chat_url(api_base),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send_conversation(
        &self,
        messages: &[WireMessage],
        session_id: Option<&SessionId>,
    ) -> Result<ByteStream, ClientError> {
        let body = ChatRequest {
            messages,
            session_id: session_id.map(SessionId::as_str),
        };
        debug!(url = %self.url, messages = messages.len(), "POST chat");

        let response = self
            .inner
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Chat request failed");
            return Err(ClientError::Status(status.as_u16()));
        }
        if status == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            warn!(status = status.as_u16(), "Chat response has no body");
            return Err(ClientError::Status(status.as_u16()));
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ClientError::from));
        Ok(Box::pin(stream))
    }
}
