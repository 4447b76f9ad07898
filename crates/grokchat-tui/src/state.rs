//! UI state for rendering.

use grokchat_core::{Conversation, SessionId};
use grokchat_ui::InputBuffer;

/// Everything the UI thread owns (no async, no locks).
pub struct UiState {
    /// Messages and the outstanding turn.
    pub conversation: Conversation,

    /// Text being composed.
    pub input: InputBuffer,

    /// Lines scrolled back from the newest message (0 = follow newest).
    pub scroll_back: usize,

    /// Furthest `scroll_back` the last drawn frame allowed.
    pub max_scroll_back: usize,

    /// Session identifier sent with every request.
    pub session_id: SessionId,

    /// Chat endpoint, shown in the header.
    pub endpoint: String,

    /// Status message from the backend (if any).
    pub status_message: Option<String>,

    /// Set when the user asked to quit.
    pub should_quit: bool,
}

impl UiState {
    pub fn new(session_id: SessionId, endpoint: impl Into<String>) -> Self {
        Self {
            conversation: Conversation::new(),
            input: InputBuffer::new(),
            scroll_back: 0,
            max_scroll_back: 0,
            session_id,
            endpoint: endpoint.into(),
            status_message: None,
            should_quit: false,
        }
    }

    /// Whether the send affordance is enabled.
    pub fn can_send(&self) -> bool {
        !self.conversation.is_loading() && !self.input.is_blank()
    }

    /// Jump back to the newest message.
    pub fn follow_newest(&mut self) {
        self.scroll_back = 0;
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_back = (self.scroll_back + lines).min(self.max_scroll_back);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }
}
