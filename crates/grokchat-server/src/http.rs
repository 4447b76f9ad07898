//! HTTP routes.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    routing::post,
    Json, Router,
};
use futures_util::StreamExt;
use grokchat_core::WireMessage;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::model::{TokenSource, TokenStream};

const DONE_SENTINEL: &str = "[DONE]";
const ERROR_PREFIX: &str = "[ERROR]";

/// Detail returned when no upstream API key is configured.
pub const MISSING_KEY_DETAIL: &str = "GROK_API_KEY is not configured";

/// Shared handler state.
pub struct AppState {
    pub api_key: Option<String>,
    pub system_prompt: Option<String>,
    pub model: Arc<dyn TokenSource>,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<WireMessage>,
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
}

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Stream the reply to a conversation as server-sent events.
async fn chat(State(state): State<Arc<AppState>>, Json(request): Json<ChatRequest>) -> Response {
    if state.api_key.as_deref().map_or(true, str::is_empty) {
        warn!("Rejecting chat request, no API key configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": MISSING_KEY_DETAIL })),
        )
            .into_response();
    }

    info!(
        session_id = request.session_id.as_deref().unwrap_or("-"),
        messages = request.messages.len(),
        "Chat request"
    );

    let tokens = state
        .model
        .stream_tokens(&request.messages, state.system_prompt.as_deref());
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(forward_tokens(tokens, tx));

    Sse::new(ReceiverStream::new(rx).map(Ok::<_, Infallible>)).into_response()
}

/// Turn model tokens into events: one per token, then the completion or
/// error sentinel. Stops early when the client disconnects.
async fn forward_tokens(mut tokens: TokenStream, tx: mpsc::Sender<Event>) {
    let mut sent = 0usize;
    while let Some(item) = tokens.next().await {
        match item {
            Ok(token) => {
                if tx.send(Event::default().data(token)).await.is_err() {
                    debug!(sent, "Client disconnected mid-reply");
                    return;
                }
                sent += 1;
            }
            Err(e) => {
                warn!(error = %e, sent, "Model failed mid-reply");
                let detail = format!("{} {}", ERROR_PREFIX, e);
                let _ = tx.send(Event::default().data(detail)).await;
                return;
            }
        }
    }

    debug!(sent, "Reply complete");
    let _ = tx.send(Event::default().data(DONE_SENTINEL)).await;
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures_util::stream;
    use grokchat_client::{ChatClient, HttpTransport, TurnOutcome};
    use grokchat_core::{Conversation, TurnError};
    use tokio::net::TcpListener;

    use super::*;
    use crate::model::{ModelError, PlaceholderModel};

    /// Model that replays canned results.
    struct ScriptedModel {
        items: Vec<Result<String, ModelError>>,
    }

    impl TokenSource for ScriptedModel {
        fn stream_tokens(&self, _messages: &[WireMessage], _prompt: Option<&str>) -> TokenStream {
            Box::pin(stream::iter(self.items.clone()))
        }
    }

    fn state(api_key: Option<&str>, model: impl TokenSource + 'static) -> AppState {
        AppState {
            api_key: api_key.map(str::to_string),
            system_prompt: None,
            model: Arc::new(model),
        }
    }

    /// Serve on an ephemeral port and return the API base URL.
    async fn serve(state: AppState) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = create_router(Arc::new(state), &[]);
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn ask(api_base: &str, text: &str) -> (TurnOutcome, Conversation) {
        let client = ChatClient::new(HttpTransport::new(api_base), None);
        let mut conversation = Conversation::new();
        conversation.append_user_message(text).unwrap();
        let outcome = client
            .stream_turn(conversation.wire_messages(), |event| {
                conversation.apply(event).unwrap()
            })
            .await;
        (outcome, conversation)
    }

    #[tokio::test]
    async fn test_streams_reply_then_done() {
        let model = PlaceholderModel::new("Hello from Grok", Duration::ZERO);
        let api_base = serve(state(Some("test-key"), model)).await;

        let (outcome, conversation) = ask(&api_base, "Hi").await;

        assert_eq!(outcome, TurnOutcome::Completed);
        assert_eq!(conversation.messages()[1].content, "Hello from Grok");
        assert!(conversation.last_error().is_none());
    }

    #[tokio::test]
    async fn test_missing_key_is_server_error() {
        let model = ScriptedModel { items: Vec::new() };
        let api_base = serve(state(None, model)).await;

        let (outcome, conversation) = ask(&api_base, "Hi").await;

        assert_eq!(
            outcome,
            TurnOutcome::Failed(TurnError::Transport { status: 500 })
        );
        assert_eq!(conversation.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_model_failure_sends_error_event() {
        let model = ScriptedModel {
            items: vec![
                Ok("Partial".to_string()),
                Err(ModelError::Upstream("model unavailable".to_string())),
                Ok("ignored".to_string()),
            ],
        };
        let api_base = serve(state(Some("test-key"), model)).await;

        let (outcome, conversation) = ask(&api_base, "Hi").await;

        assert_eq!(
            outcome,
            TurnOutcome::Failed(TurnError::Stream("model unavailable".into()))
        );
        assert_eq!(conversation.messages()[1].content, "Partial");
    }

    #[test]
    fn test_request_accepts_missing_session() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"messages":[{"role":"user","content":"Hi"}]}"#).unwrap();
        assert_eq!(request.messages.len(), 1);
        assert!(request.session_id.is_none());

        let request: ChatRequest =
            serde_json::from_str(r#"{"messages":[],"sessionId":"abc"}"#).unwrap();
        assert_eq!(request.session_id.as_deref(), Some("abc"));
    }
}
