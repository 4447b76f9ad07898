//! Footer widget: status on the left, key help after it.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::theme::{Status, Theme};

/// Footer widget displaying status and help text.
#[derive(Debug, Clone)]
pub struct Footer<'a> {
    /// Status message.
    status: &'a str,
    /// Kind of status, selects its color.
    kind: Status,
    /// Key help.
    help: &'a str,
    /// Theme for styling.
    theme: Theme,
}

impl<'a> Footer<'a> {
    /// Create a new footer with help text.
    pub fn new(help: &'a str) -> Self {
        Self {
            status: "Ready",
            kind: Status::Ready,
            help,
            theme: Theme::default(),
        }
    }

    /// Set the status message and its kind.
    pub fn status(mut self, status: &'a str, kind: Status) -> Self {
        self.status = status;
        self.kind = kind;
        self
    }

    /// Set the theme.
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Render the footer.
    pub fn render(self, frame: &mut Frame, area: Rect) {
        let footer = Line::from(vec![
            Span::styled(format!(" {} ", self.status), self.theme.status(self.kind)),
            Span::raw("|"),
            Span::styled(format!(" {} ", self.help), self.theme.muted()),
        ]);
        frame.render_widget(Paragraph::new(footer), area);
    }
}
