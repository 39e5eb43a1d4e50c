//! The interactive chat screen: state, key handling and the event loop.

mod app;
mod event_loop;
pub mod lifecycle;

pub use app::{ChatApp, Effect, Focus, HELP_TEXT};
pub use event_loop::{run_chat, ChatOptions};
