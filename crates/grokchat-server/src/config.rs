//! Server configuration.

use std::time::Duration;

/// Reply streamed by the placeholder model.
pub const DEFAULT_REPLY: &str = "Hello from Grok";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Upstream API key. Requests are refused with 500 while unset.
    pub api_key: Option<String>,

    /// Model name, logged at startup.
    pub model: String,

    /// Prepended to every conversation handed to the model.
    pub system_prompt: Option<String>,

    /// Origins allowed by CORS.
    pub allowed_origins: Vec<String>,

    /// Text the placeholder model streams back.
    pub reply: String,

    /// Pause before each streamed token.
    pub token_delay: Duration,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            api_key: None,
            model: "grok-2-latest".to_string(),
            system_prompt: None,
            allowed_origins: vec!["http://localhost:5173".to_string()],
            reply: DEFAULT_REPLY.to_string(),
            token_delay: Duration::from_millis(100),
        }
    }
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
