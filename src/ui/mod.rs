//! Terminal UI for interactive chat sessions.
//!
//! - [`chat_loop`]: screen state, key handling and the event loop that feeds
//!   request completions back into [`crate::core::widget::ChatWidget`].
//! - [`renderer`]: frame layout (status line, transcript, Name and Message
//!   fields, alert modal).
//! - [`markup`]: converts rendered chat text into styled lines.
//! - [`wrap`]: wraps styled lines to the terminal width.

pub mod chat_loop;
pub mod markup;
pub mod renderer;
pub mod wrap;
