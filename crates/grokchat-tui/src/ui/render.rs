//! Main render function for the TUI.

use grokchat_ui::{truncate, ChatWidget, Footer, InputWidget, Status, Theme};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::state::UiState;

/// Maximum number of text rows the input box grows to.
const MAX_INPUT_ROWS: usize = 5;

const HELP: &str = "Enter: send | Shift+Enter: newline | PgUp/PgDn: scroll | Esc: quit";

/// Render the entire UI.
///
/// Returns how far the transcript can be scrolled back in this frame.
pub fn render(frame: &mut Frame, state: &UiState) -> usize {
    let theme = Theme::default();
    let area = frame.area();

    let input_rows = state.input.line_count().clamp(1, MAX_INPUT_ROWS) as u16;

    // Create main layout: header, transcript, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(input_rows + 2),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area, state, &theme);

    let chat = ChatWidget::new(state.conversation.messages())
        .typing(state.conversation.is_loading())
        .error(state.conversation.last_error())
        .scroll_back(state.scroll_back)
        .theme(theme.clone());
    let max_scroll = chat.max_scroll(chat_area);
    chat.render(frame, chat_area);

    InputWidget::new(&state.input)
        .busy(state.conversation.is_loading())
        .theme(theme.clone())
        .render(frame, input_area);

    render_footer(frame, footer_area, state, &theme);

    max_scroll
}

/// Render the one-line header with session and endpoint.
fn render_header(frame: &mut Frame, area: Rect, state: &UiState, theme: &Theme) {
    let session_short: String = state.session_id.as_str().chars().take(8).collect();
    let endpoint_width = (area.width as usize).saturating_sub(40);

    let header = Line::from(vec![
        Span::styled(" grokchat ", theme.brand()),
        Span::styled(format!("session {} ", session_short), theme.muted()),
        Span::raw("| "),
        Span::styled(truncate(&state.endpoint, endpoint_width), theme.muted()),
    ]);

    frame.render_widget(Paragraph::new(header), area);
}

/// Render the footer with status message.
fn render_footer(frame: &mut Frame, area: Rect, state: &UiState, theme: &Theme) {
    let conversation = &state.conversation;
    let (status, kind) = if let Some(message) = state.status_message.as_deref() {
        (message, Status::Notice)
    } else if conversation.is_loading() {
        ("Streaming reply\u{2026}", Status::Streaming)
    } else if conversation.last_error().is_some() {
        ("Last turn failed", Status::Failed)
    } else {
        ("Ready", Status::Ready)
    };

    Footer::new(HELP)
        .status(status, kind)
        .theme(theme.clone())
        .render(frame, area);
}
