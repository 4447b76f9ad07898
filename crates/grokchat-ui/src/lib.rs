//! TUI components for grokchat.
//!
//! This crate provides the widgets, input editing and text utilities the
//! terminal client is drawn with.
//!
//! # Architecture
//!
//! The crate is organized into:
//! - `widgets` - ratatui widgets (chat transcript, input box, footer)
//! - `input` - multi-line input buffer with a char-based cursor
//! - `theme` - Colors, styles, and visual constants
//! - `utils` - Text wrapping, formatting utilities

pub mod input;
pub mod theme;
pub mod utils;
pub mod widgets;

pub use input::InputBuffer;
pub use theme::{Status, Theme};
pub use utils::{format_timestamp, truncate, wrap_text_indented};
pub use widgets::chat::ChatWidget;
pub use widgets::footer::Footer;
pub use widgets::input::InputWidget;
