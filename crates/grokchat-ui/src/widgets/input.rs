//! Input box widget.

use ratatui::layout::{Alignment, Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::input::InputBuffer;
use crate::theme::Theme;

const PLACEHOLDER: &str = "Type your message\u{2026}";

/// Multi-line message input with a send affordance.
#[derive(Debug, Clone)]
pub struct InputWidget<'a> {
    input: &'a InputBuffer,
    /// Whether a reply is outstanding (input stays editable, sending is not).
    busy: bool,
    theme: Theme,
}

impl<'a> InputWidget<'a> {
    pub fn new(input: &'a InputBuffer) -> Self {
        Self {
            input,
            busy: false,
            theme: Theme::default(),
        }
    }

    pub fn busy(mut self, busy: bool) -> Self {
        self.busy = busy;
        self
    }

    /// Set the theme.
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Whether the send affordance is enabled.
    pub fn can_send(&self) -> bool {
        !self.busy && !self.input.is_blank()
    }

    /// Render the widget and place the terminal cursor.
    pub fn render(self, frame: &mut Frame, area: Rect) {
        let can_send = self.can_send();
        let border_style = self.theme.border(can_send);
        let send_label = if self.busy { " Waiting\u{2026} " } else { " Send \u{23ce} " };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Message ")
            .title_bottom(
                Line::from(Span::styled(send_label, border_style)).alignment(Alignment::Right),
            );

        let visible_rows = area.height.saturating_sub(2) as usize;
        let (cursor_col, cursor_row) = self.input.cursor_display_position();
        // Keep the cursor row on screen.
        let row_offset = cursor_row.saturating_sub(visible_rows.saturating_sub(1));

        let paragraph = if self.input.is_empty() {
            Paragraph::new(Span::styled(PLACEHOLDER, self.theme.muted()))
        } else {
            let lines: Vec<Line> = self.input.text().split('\n').map(Line::from).collect();
            Paragraph::new(lines).scroll((row_offset as u16, 0))
        };
        frame.render_widget(paragraph.block(block), area);

        let inner_width = area.width.saturating_sub(2) as usize;
        let x = area.x + 1 + cursor_col.min(inner_width.saturating_sub(1)) as u16;
        let y = area.y + 1 + (cursor_row - row_offset) as u16;
        frame.set_cursor_position(Position::new(x, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_disabled_when_blank_or_busy() {
        let mut input = InputBuffer::new();
        assert!(!InputWidget::new(&input).can_send());

        input.insert_str("  ");
        assert!(!InputWidget::new(&input).can_send());

        input.insert_str("hi");
        assert!(InputWidget::new(&input).can_send());
        assert!(!InputWidget::new(&input).busy(true).can_send());
    }
}
