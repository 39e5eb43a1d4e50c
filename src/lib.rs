//! Sous is a terminal chat client for a personal cooking assistant server.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the chat widget state machine, the transcript, text
//!   formatting, request dispatch and configuration.
//! - [`api`] defines the HTTP payloads and the [`api::ChatBackend`] trait with
//!   its `reqwest` implementation.
//! - [`ui`] renders the terminal interface and runs the interactive event loop.
//! - [`cli`] parses arguments and runs the chat screen or one-shot commands.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
