//! grokchat development backend.

use std::error::Error;
use std::time::Duration;

use clap::Parser;
use grokchat_server::config::{parse_origins, DEFAULT_REPLY};
use grokchat_server::ServerConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grokchat-server")]
#[command(about = "Development chat backend streaming replies over SSE")]
#[command(version)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to bind
    #[arg(long, env = "PORT", default_value = "8000")]
    port: u16,

    /// Upstream API key; chat requests fail with 500 while unset
    #[arg(long, env = "GROK_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model name
    #[arg(long, env = "GROK_MODEL", default_value = "grok-2-latest")]
    model: String,

    /// System prompt handed to the model with every conversation
    #[arg(long, env = "SYSTEM_PROMPT")]
    system_prompt: Option<String>,

    /// Comma-separated CORS origins
    #[arg(long, env = "ALLOWED_ORIGINS", default_value = "http://localhost:5173")]
    allowed_origins: String,

    /// Reply streamed by the placeholder model
    #[arg(long, default_value = DEFAULT_REPLY)]
    reply: String,

    /// Delay before each streamed token, in milliseconds
    #[arg(long, default_value = "100")]
    token_delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("grokchat_server=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ServerConfig {
        host: cli.host,
        port: cli.port,
        api_key: cli.api_key,
        model: cli.model,
        system_prompt: cli.system_prompt,
        allowed_origins: parse_origins(&cli.allowed_origins),
        reply: cli.reply,
        token_delay: Duration::from_millis(cli.token_delay_ms),
    };

    grokchat_server::run(config).await?;
    Ok(())
}
