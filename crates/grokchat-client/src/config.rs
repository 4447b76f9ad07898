//! Client configuration.

use std::path::PathBuf;

/// Storage key the session identifier is persisted under.
pub const DEFAULT_SESSION_KEY: &str = "grok_session_id";

/// API base used when nothing is configured at build or run time.
pub const FALLBACK_API_BASE: &str = "http://localhost:8000";

/// Client configuration, passed explicitly to everything that needs it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the chat backend (without the `/api/chat` path).
    pub api_base: String,

    /// Key the session identifier is stored under.
    pub storage_key: String,

    /// Location of the persistent key/value store.
    pub storage_path: PathBuf,
}

impl ClientConfig {
    /// API base selected at build time via `GROKCHAT_API_BASE`.
    pub fn build_time_api_base() -> &'static str {
        option_env!("GROKCHAT_API_BASE").unwrap_or(FALLBACK_API_BASE)
    }

    /// Default store file: `<config dir>/grokchat/storage.json`.
    pub fn default_storage_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("grokchat")
            .join("storage.json")
    }

    /// Full URL of the chat endpoint.
    pub fn chat_url(&self) -> String {
        chat_url(&self.api_base)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: Self::build_time_api_base().to_string(),
            storage_key: DEFAULT_SESSION_KEY.to_string(),
            storage_path: Self::default_storage_path(),
        }
    }
}

pub(crate) fn chat_url(api_base: &str) -> String {
    format!("{}/api/chat", api_base.trim_end_matches('/'))
}
