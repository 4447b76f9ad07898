//! Development backend for grokchat.
//!
//! Serves `POST /api/chat`: takes the conversation history and streams the
//! reply back as server-sent events, one token per `data:` event, followed by
//! `data: [DONE]`. A model failure mid-reply is reported as
//! `data: [ERROR] <detail>` and ends the stream.
//!
//! The model behind it is pluggable through [`TokenSource`]; the bundled
//! [`PlaceholderModel`] replays a fixed reply.

pub mod config;
pub mod error;
pub mod http;
pub mod model;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

pub use config::ServerConfig;
pub use error::ServerError;
pub use http::{create_router, AppState, ChatRequest};
pub use model::{ModelError, PlaceholderModel, TokenSource, TokenStream};

/// Bind the configured address and serve until the process is stopped.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let model = PlaceholderModel::new(config.reply.clone(), config.token_delay);
    let state = Arc::new(AppState {
        api_key: config.api_key.clone(),
        system_prompt: config.system_prompt.clone(),
        model: Arc::new(model),
    });
    let router = create_router(state, &config.allowed_origins);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, model = %config.model, "Chat backend listening");

    axum::serve(listener, router).await?;
    Ok(())
}
