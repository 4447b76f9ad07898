//! Text utilities for TUI rendering.

use chrono::{Local, TimeZone};
use unicode_width::UnicodeWidthChar;

/// Word-wrap text with an indent prefix on every line.
///
/// Prefers breaking at the last space that fits; falls back to a hard break
/// for words longer than the available width.
pub fn wrap_text_indented(text: &str, width: usize, indent: &str) -> Vec<String> {
    let effective_width = width.saturating_sub(indent.chars().count());

    if effective_width == 0 {
        return vec![format!("{}{}", indent, text)];
    }

    let mut lines = Vec::new();

    for line in text.lines() {
        if line.is_empty() {
            lines.push(indent.to_string());
            continue;
        }

        let chars: Vec<char> = line.chars().collect();
        let mut start = 0;

        while start < chars.len() {
            let remaining_chars = chars.len() - start;

            if remaining_chars <= effective_width {
                let remaining: String = chars[start..].iter().collect();
                lines.push(format!("{}{}", indent, remaining));
                break;
            }

            // Include the char just past the width: a space there is a
            // perfect break.
            let window_end = (start + effective_width + 1).min(chars.len());
            let break_offset = chars[start..window_end]
                .iter()
                .rposition(|c| *c == ' ')
                .filter(|offset| *offset > 0)
                .unwrap_or(effective_width);
            let actual_end = start + break_offset;

            let chunk: String = chars[start..actual_end].iter().collect();
            lines.push(format!("{}{}", indent, chunk.trim_end()));

            start = actual_end;
            while start < chars.len() && chars[start] == ' ' {
                start += 1;
            }
        }
    }

    if lines.is_empty() {
        lines.push(indent.to_string());
    }

    lines
}

/// Truncate a string to fit within a given width, adding ellipsis if needed.
pub fn truncate(text: &str, max_width: usize) -> String {
    if max_width < 3 {
        return text.chars().take(max_width).collect();
    }

    let mut width = 0;
    let mut result = String::new();

    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(1);
        if width + ch_width > max_width - 3 {
            result.push_str("...");
            return result;
        }
        result.push(ch);
        width += ch_width;
    }

    result
}

/// Format epoch milliseconds as local `HH:MM:SS`.
pub fn format_timestamp(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms).single() {
        Some(time) => time.format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}
