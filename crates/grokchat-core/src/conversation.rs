//! In-memory conversation state.
//!
//! The conversation is append-only. The only mutable message is the active
//! assistant reply, whose content is rebuilt as fragments arrive.

use crate::chat::{ChatMessage, ChatRole, WireMessage};
use crate::error::{CoreError, TurnError};

/// Progress of a single turn, as reported by the stream driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    /// The response headers arrived; the assistant reply begins.
    Started,
    /// One decoded fragment of assistant text.
    Fragment(String),
    /// The server sent the completion sentinel.
    Completed,
    /// The turn ended with an error.
    Failed(TurnError),
}

/// Ordered list of messages plus the state of the outstanding turn.
#[derive(Debug, Default, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    /// Index of the assistant message currently being streamed.
    active: Option<usize>,
    loading: bool,
    last_error: Option<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether a request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The assistant message currently being streamed, if any.
    pub fn active_message(&self) -> Option<&ChatMessage> {
        self.active.and_then(|idx| self.messages.get(idx))
    }

    /// Role/content pairs for the request body.
    pub fn wire_messages(&self) -> Vec<WireMessage> {
        self.messages.iter().map(ChatMessage::to_wire).collect()
    }

    /// Append a user message and mark a turn as outstanding.
    ///
    /// The text is trimmed; empty text is rejected, as is a new message
    /// while the previous reply is still streaming.
    pub fn append_user_message(&mut self, text: &str) -> Result<&ChatMessage, CoreError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyMessage);
        }
        if self.loading {
            return Err(CoreError::TurnInProgress);
        }

        self.messages.push(ChatMessage::user(trimmed));
        self.last_error = None;
        self.loading = true;
        Ok(&self.messages[self.messages.len() - 1])
    }

    /// Append an empty assistant message and make it the fragment target.
    pub fn begin_assistant_message(&mut self) -> Result<(), CoreError> {
        if self.active.is_some() {
            return Err(CoreError::TurnInProgress);
        }
        self.messages.push(ChatMessage::new(ChatRole::Assistant, String::new()));
        self.active = Some(self.messages.len() - 1);
        Ok(())
    }

    /// Rebuild the active message as `previous + " " + fragment`.
    pub fn apply_fragment(&mut self, fragment: &str) -> Result<(), CoreError> {
        let idx = self.active.ok_or(CoreError::NoActiveTurn)?;
        let message = &mut self.messages[idx];
        message.content = if message.content.is_empty() {
            fragment.to_string()
        } else {
            format!("{} {}", message.content, fragment)
        };
        Ok(())
    }

    /// End the outstanding turn with an error.
    pub fn set_error(&mut self, text: impl Into<String>) {
        self.last_error = Some(text.into());
        self.end_turn();
    }

    /// End the outstanding turn successfully.
    pub fn finish_turn(&mut self) {
        self.end_turn();
    }

    /// Apply a turn event from the stream driver.
    pub fn apply(&mut self, event: TurnEvent) -> Result<(), CoreError> {
        match event {
            TurnEvent::Started => self.begin_assistant_message(),
            TurnEvent::Fragment(text) => self.apply_fragment(&text),
            TurnEvent::Completed => {
                self.finish_turn();
                Ok(())
            }
            TurnEvent::Failed(err) => {
                self.set_error(err.to_string());
                Ok(())
            }
        }
    }

    fn end_turn(&mut self) {
        self.active = None;
        self.loading = false;
    }
}
