//! Application state and main event loop.

use std::time::Duration;

use grokchat_core::TurnEvent;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::event::{BackendCommand, UiEvent};
use crate::state::UiState;
use crate::ui;

/// Lines moved by PageUp/PageDown.
const PAGE_LINES: usize = 10;

/// Main application with UI state and channel handles.
pub struct App {
    /// Current UI state snapshot for rendering.
    state: UiState,

    /// Receiver for events from the backend.
    ui_rx: mpsc::UnboundedReceiver<UiEvent>,

    /// Sender for commands to the backend.
    cmd_tx: mpsc::Sender<BackendCommand>,
}

impl App {
    pub fn new(
        state: UiState,
        ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        cmd_tx: mpsc::Sender<BackendCommand>,
    ) -> Self {
        Self {
            state,
            ui_rx,
            cmd_tx,
        }
    }

    /// Run the main event loop.
    ///
    /// This runs on the main thread and handles:
    /// - Drawing the UI
    /// - Processing keyboard input
    /// - Receiving turn events from the backend
    pub fn run(&mut self, mut terminal: DefaultTerminal) -> std::io::Result<()> {
        loop {
            let mut max_scroll = 0;
            terminal.draw(|frame| max_scroll = ui::render(frame, &self.state))?;
            self.state.max_scroll_back = max_scroll;
            self.state.scroll_back = self.state.scroll_back.min(max_scroll);

            // Poll terminal events (non-blocking with short timeout)
            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Event::Paste(text) => self.state.input.insert_str(&text),
                    _ => {}
                }
            }

            // Process backend events (non-blocking)
            while let Ok(event) = self.ui_rx.try_recv() {
                self.apply_event(event);
            }

            if self.state.should_quit {
                break;
            }
        }

        // Send quit command to backend
        let _ = self.cmd_tx.blocking_send(BackendCommand::Quit);

        Ok(())
    }

    /// Apply an event from the backend to the UI state.
    fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Turn(turn) => {
                let finished = matches!(turn, TurnEvent::Completed | TurnEvent::Failed(_));
                if let Err(e) = self.state.conversation.apply(turn) {
                    warn!(error = %e, "Dropped turn event");
                }
                if finished {
                    self.state.status_message = None;
                }
                self.state.follow_newest();
            }
            UiEvent::Status(message) => {
                self.state.status_message = Some(message);
            }
        }
    }

    /// Handle a key press.
    fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let newline_modifier = key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);

        match key.code {
            // Quit
            KeyCode::Esc => self.state.should_quit = true,
            KeyCode::Char('c') if ctrl => self.state.should_quit = true,

            // Newline: Shift+Enter, or Alt+Enter / Ctrl+J where Shift is not reported
            KeyCode::Enter if newline_modifier => self.state.input.insert_newline(),
            KeyCode::Char('j') if ctrl => self.state.input.insert_newline(),
            KeyCode::Enter => self.submit(),

            // Editing
            KeyCode::Char(c) if !ctrl => self.state.input.insert_char(c),
            KeyCode::Backspace => self.state.input.backspace(),
            KeyCode::Delete => self.state.input.delete(),
            KeyCode::Left => self.state.input.move_left(),
            KeyCode::Right => self.state.input.move_right(),
            KeyCode::Home => self.state.input.move_home(),

            // Transcript scrolling; arrows and End scroll only while the input is empty
            KeyCode::PageUp => self.state.scroll_up(PAGE_LINES),
            KeyCode::PageDown => self.state.scroll_down(PAGE_LINES),
            KeyCode::Up if self.state.input.is_empty() => self.state.scroll_up(1),
            KeyCode::Down if self.state.input.is_empty() => self.state.scroll_down(1),
            KeyCode::End if self.state.input.is_empty() => self.state.follow_newest(),
            KeyCode::End => self.state.input.move_end(),

            _ => {}
        }
    }

    /// Append the typed message and hand the history to the backend.
    fn submit(&mut self) {
        if !self.state.can_send() {
            return;
        }

        let text = self.state.input.text().to_string();
        if let Err(e) = self.state.conversation.append_user_message(&text) {
            debug!(error = %e, "Message rejected");
            return;
        }
        self.state.input.clear();
        self.state.status_message = None;
        self.state.follow_newest();

        let messages = self.state.conversation.wire_messages();
        debug!(count = messages.len(), "Submitting conversation");
        if self
            .cmd_tx
            .blocking_send(BackendCommand::SendConversation(messages))
            .is_err()
        {
            warn!("Backend is gone, cannot send message");
            self.state.conversation.set_error("Chat backend is not running");
        }
    }
}
