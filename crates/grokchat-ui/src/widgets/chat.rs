//! Chat widget for displaying the conversation transcript.

use grokchat_core::{ChatMessage, ChatRole};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::theme::Theme;
use crate::utils::{format_timestamp, wrap_text_indented};

/// Portion of the width a single message may occupy.
const BUBBLE_WIDTH_PERCENT: usize = 70;

/// Transcript of the conversation.
///
/// User messages are right-aligned, everything else left-aligned. The
/// typing indicator and the last error are drawn below the messages.
#[derive(Debug, Clone)]
pub struct ChatWidget<'a> {
    /// Messages to display.
    messages: &'a [ChatMessage],
    /// Whether a reply is outstanding.
    typing: bool,
    /// Last error, shown under the transcript.
    error: Option<&'a str>,
    /// Lines scrolled back from the newest message (0 = follow newest).
    scroll_back: usize,
    /// Theme for styling.
    theme: Theme,
}

impl<'a> ChatWidget<'a> {
    /// Create a new chat widget.
    pub fn new(messages: &'a [ChatMessage]) -> Self {
        Self {
            messages,
            typing: false,
            error: None,
            scroll_back: 0,
            theme: Theme::default(),
        }
    }

    /// Show the typing indicator.
    pub fn typing(mut self, typing: bool) -> Self {
        self.typing = typing;
        self
    }

    /// Set the error line.
    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }

    /// Set how many lines the view is scrolled back from the bottom.
    pub fn scroll_back(mut self, lines: usize) -> Self {
        self.scroll_back = lines;
        self
    }

    /// Set the theme.
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Build every transcript line for a given inner width.
    pub fn lines(&self, text_width: usize) -> Vec<Line<'static>> {
        let bubble_width = (text_width * BUBBLE_WIDTH_PERCENT / 100).max(10);
        let mut all_lines: Vec<Line<'static>> = Vec::new();

        for msg in self.messages {
            let (label, alignment) = match msg.role {
                ChatRole::User => ("You", Alignment::Right),
                ChatRole::Assistant => ("Assistant", Alignment::Left),
                ChatRole::System => ("System", Alignment::Left),
            };
            let style = self.theme.role(msg.role);

            all_lines.push(
                Line::from(vec![
                    Span::styled(label, style.add_modifier(Modifier::BOLD)),
                    Span::raw(" "),
                    Span::styled(format_timestamp(msg.timestamp_ms), self.theme.muted()),
                ])
                .alignment(alignment),
            );

            for wrapped_line in wrap_text_indented(&msg.content, bubble_width, "") {
                all_lines.push(Line::from(Span::styled(wrapped_line, style)).alignment(alignment));
            }

            all_lines.push(Line::from(""));
        }

        if self.typing {
            all_lines.push(Line::from(Span::styled(
                "Assistant is typing\u{2026}",
                self.theme.typing(),
            )));
        }

        if let Some(error) = self.error {
            for wrapped_line in wrap_text_indented(&format!("Error: {}", error), text_width, "") {
                all_lines.push(Line::from(Span::styled(
                    wrapped_line,
                    self.theme.error(),
                )));
            }
        }

        all_lines
    }

    /// How far the transcript can be scrolled back when drawn in `area`.
    pub fn max_scroll(&self, area: Rect) -> usize {
        let visible_height = area.height.saturating_sub(2) as usize;
        let text_width = area.width.saturating_sub(2) as usize;
        self.lines(text_width).len().saturating_sub(visible_height)
    }

    /// Render the widget.
    pub fn render(self, frame: &mut Frame, area: Rect) {
        let visible_height = area.height.saturating_sub(2) as usize;
        let text_width = area.width.saturating_sub(2) as usize;

        let all_lines = self.lines(text_width);
        let total_lines = all_lines.len();

        // Offset from the top; scrolling back never goes past the first line.
        let max_scroll = total_lines.saturating_sub(visible_height);
        let scroll_offset = max_scroll.saturating_sub(self.scroll_back);

        let lines: Vec<Line> = all_lines
            .into_iter()
            .skip(scroll_offset)
            .take(visible_height)
            .collect();

        let title = if total_lines == 0 {
            " Chat ".to_string()
        } else {
            let first_line = scroll_offset + 1;
            let last_line = (scroll_offset + visible_height).min(total_lines);
            format!(" Chat [{}-{}/{}] ", first_line, last_line, total_lines)
        };

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(self.theme.border(false))
                .title(title),
        );

        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_roles_aligned() {
        let messages = vec![ChatMessage::user("hi"), ChatMessage::assistant("Hi there")];
        let lines = ChatWidget::new(&messages).lines(40);

        assert_eq!(lines[0].alignment, Some(Alignment::Right));
        assert_eq!(text_of(&lines[1]), "hi");
        assert_eq!(lines[1].alignment, Some(Alignment::Right));
        assert_eq!(text_of(&lines[4]), "Hi there");
        assert_eq!(lines[4].alignment, Some(Alignment::Left));
    }

    #[test]
    fn test_typing_and_error_lines() {
        let messages = vec![ChatMessage::user("hi")];
        let lines = ChatWidget::new(&messages)
            .typing(true)
            .error(Some("disk full"))
            .lines(40);

        let rendered: Vec<String> = lines.iter().map(text_of).collect();
        assert!(rendered.contains(&"Assistant is typing\u{2026}".to_string()));
        assert_eq!(rendered.last().unwrap(), "Error: disk full");
    }

    #[test]
    fn test_long_message_wraps_within_bubble() {
        let messages = vec![ChatMessage::assistant("one two three four five six")];
        let lines = ChatWidget::new(&messages).lines(20);
        // 70% of 20 columns leaves 14 per line.
        assert_eq!(text_of(&lines[1]), "one two three");
        assert_eq!(text_of(&lines[2]), "four five six");
    }
}
