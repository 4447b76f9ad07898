//! Event types for communication between the backend thread and the UI.

use grokchat_core::{TurnEvent, WireMessage};

/// Events sent from the backend to the UI thread.
#[derive(Debug)]
pub enum UiEvent {
    /// Progress of the outstanding turn.
    Turn(TurnEvent),

    /// Informational status for the footer.
    Status(String),
}

/// Commands sent from the UI to the backend.
#[derive(Debug)]
pub enum BackendCommand {
    /// Send the full history and stream the reply.
    SendConversation(Vec<WireMessage>),

    /// Quit the application.
    Quit,
}
