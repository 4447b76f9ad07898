//! Colors for the chat client and the styles derived from them.

use grokchat_core::ChatRole;
use ratatui::style::{Color, Modifier, Style};

/// Where the conversation stands, as shown in the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Idle; a message can be sent.
    Ready,
    /// A reply is streaming in.
    Streaming,
    /// The last turn ended with an error.
    Failed,
    /// Informational message from the backend.
    Notice,
}

/// Palette for the grokchat TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Active borders and the app name.
    pub accent: Color,
    /// Timestamps, placeholders, help text, idle borders.
    pub muted: Color,
    pub ready: Color,
    pub streaming: Color,
    pub failed: Color,
    pub user: Color,
    pub assistant: Color,
    pub system: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            muted: Color::DarkGray,
            ready: Color::Green,
            streaming: Color::Yellow,
            failed: Color::Red,
            user: Color::White,
            assistant: Color::LightBlue,
            system: Color::Magenta,
        }
    }
}

impl Theme {
    /// Border style; `active` borders are drawn in the accent color.
    pub fn border(&self, active: bool) -> Style {
        let color = if active { self.accent } else { self.muted };
        Style::default().fg(color)
    }

    /// Bold accent, for the app name in the header.
    pub fn brand(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Text color for a message author.
    pub fn role(&self, role: ChatRole) -> Style {
        let color = match role {
            ChatRole::User => self.user,
            ChatRole::Assistant => self.assistant,
            ChatRole::System => self.system,
        };
        Style::default().fg(color)
    }

    /// The "Assistant is typing" line.
    pub fn typing(&self) -> Style {
        self.muted().add_modifier(Modifier::ITALIC)
    }

    /// Error text under the transcript.
    pub fn error(&self) -> Style {
        Style::default().fg(self.failed)
    }

    /// Footer status text.
    pub fn status(&self, status: Status) -> Style {
        match status {
            Status::Ready => Style::default().fg(self.ready),
            Status::Streaming => Style::default().fg(self.streaming),
            Status::Failed => self.error().add_modifier(Modifier::BOLD),
            Status::Notice => self.muted(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_colors_distinct() {
        let theme = Theme::default();
        assert_ne!(theme.role(ChatRole::User), theme.role(ChatRole::Assistant));
        assert_eq!(theme.role(ChatRole::Assistant).fg, Some(theme.assistant));
    }

    #[test]
    fn test_border_dims_when_inactive() {
        let theme = Theme::default();
        assert_eq!(theme.border(true).fg, Some(theme.accent));
        assert_eq!(theme.border(false).fg, Some(theme.muted));
    }
}
