//! grokchat terminal client.
//!
//! Streams replies from a grok chat backend into a terminal UI, or answers a
//! single question on stdout.

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use grokchat_client::{ChatClient, ClientConfig, HttpTransport, IdentityStore};
use grokchat_core::{Conversation, TurnEvent};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod backend;
mod event;
mod state;
mod ui;

use app::App;
use event::{BackendCommand, UiEvent};
use state::UiState;

/// Log filter for the TUI log file when `RUST_LOG` is unset.
const TUI_LOG_FILTER: &str = "grokchat=debug,grokchat_client=debug,grokchat_core=debug";

/// Log filter for stderr logging when `RUST_LOG` is unset.
const STDERR_LOG_FILTER: &str = "warn";

#[derive(Parser)]
#[command(name = "grokchat")]
#[command(about = "Terminal chat client with streaming replies")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Base URL of the chat backend
    #[arg(long, global = true, env = "GROKCHAT_API_BASE")]
    api_base: Option<String>,

    /// Path of the JSON file the session id is stored in
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    /// Storage key for the session id
    #[arg(long, global = true)]
    session_key: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (default)
    Chat,

    /// Send one message and print the streamed reply
    Ask {
        /// Message to send
        message: String,
    },

    /// Print the persisted session id
    Session {
        /// Forget the current id and create a new one
        #[arg(long)]
        reset: bool,
    },
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::default();
        if let Some(api_base) = &self.api_base {
            config.api_base = api_base.clone();
        }
        if let Some(storage) = &self.storage {
            config.storage_path = storage.clone();
        }
        if let Some(key) = &self.session_key {
            config.storage_key = key.clone();
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = cli.client_config();

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            init_file_logging();
            run_chat_tui(config)
        }
        Commands::Ask { message } => {
            init_stderr_logging();
            run_ask(config, &message)
        }
        Commands::Session { reset } => {
            init_stderr_logging();
            run_session(config, reset)
        }
    }
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Log to a file so log lines never corrupt the terminal UI.
fn init_file_logging() {
    let path = std::env::temp_dir().join("grokchat.log");
    if let Ok(file) = std::fs::File::create(path) {
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_env_filter(env_filter(TUI_LOG_FILTER))
            .with_ansi(false)
            .init();
    }
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(STDERR_LOG_FILTER))
        .init();
}

fn run_chat_tui(config: ClientConfig) -> Result<(), Box<dyn Error>> {
    let session_id = IdentityStore::open(&config).get_or_create_session_id();
    let transport = HttpTransport::new(&config.api_base);
    let endpoint = transport.url().to_string();
    info!(endpoint = %endpoint, session = %session_id, "Starting chat TUI");

    let client = ChatClient::new(transport, Some(session_id.clone()));

    // Create channels for UI <-> backend communication
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (cmd_tx, cmd_rx) = mpsc::channel::<BackendCommand>(32);

    // Spawn background thread with its own tokio runtime
    let rt = tokio::runtime::Runtime::new()?;
    let bg_handle = std::thread::spawn(move || {
        rt.block_on(backend::run_backend(client, ui_tx, cmd_rx));
    });

    // Initialize terminal (enters alternate screen, enables raw mode)
    let terminal = ratatui::init();

    // Run UI loop on main thread
    let mut app = App::new(UiState::new(session_id, endpoint), ui_rx, cmd_tx);
    let result = app.run(terminal);

    // Restore terminal (exits alternate screen, disables raw mode)
    ratatui::restore();

    // Wait for background thread to finish
    let _ = bg_handle.join();

    info!("TUI shutdown complete");

    result.map_err(|e| e.into())
}

fn run_ask(config: ClientConfig, message: &str) -> Result<(), Box<dyn Error>> {
    let session_id = IdentityStore::open(&config).get_or_create_session_id();
    let client = ChatClient::new(HttpTransport::new(&config.api_base), Some(session_id));

    let mut conversation = Conversation::new();
    conversation.append_user_message(message)?;

    let rt = tokio::runtime::Runtime::new()?;
    let mut stdout = std::io::stdout();
    let mut printed_any = false;
    rt.block_on(client.stream_turn(conversation.wire_messages(), |event| {
        if let TurnEvent::Fragment(text) = &event {
            let separator = if printed_any { " " } else { "" };
            let _ = write!(stdout, "{}{}", separator, text);
            let _ = stdout.flush();
            printed_any = true;
        }
        if let Err(e) = conversation.apply(event) {
            warn!(error = %e, "Dropped turn event");
        }
    }));

    if printed_any {
        println!();
    }

    match conversation.last_error() {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

fn run_session(config: ClientConfig, reset: bool) -> Result<(), Box<dyn Error>> {
    let mut identity = IdentityStore::open(&config);
    if reset {
        identity.reset()?;
        info!("Session id cleared");
    }
    println!("{}", identity.get_or_create_session_id());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tui_log_filter_covers_every_crate() {
        for target in ["grokchat", "grokchat_client", "grokchat_core"] {
            let directive = format!("{}=debug", target);
            assert!(
                TUI_LOG_FILTER.split(',').any(|d| d == directive),
                "missing {}",
                directive
            );
        }
        assert!(EnvFilter::try_new(TUI_LOG_FILTER).is_ok());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "grokchat",
            "--api-base",
            "http://chat.internal:9000",
            "--session-key",
            "other_key",
            "session",
        ]);
        let config = cli.client_config();
        assert_eq!(config.api_base, "http://chat.internal:9000");
        assert_eq!(config.storage_key, "other_key");
        assert!(matches!(cli.command, Some(Commands::Session { reset: false })));
    }
}
