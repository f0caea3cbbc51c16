//! Hikmat is a terminal client for a Unani medicine assistant that streams
//! Markdown answers from a remote endpoint.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns application state, the topic catalog, the persisted
//!   transcript and preferences, and streaming of assistant replies.
//! - [`ui`] renders the terminal interface and runs the interactive event loop
//!   that drives user input and display updates.
//! - [`cli`] parses arguments and runs the headless subcommands.
//! - [`logging`] installs the optional file-backed `tracing` subscriber.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which initializes and dispatches into
//! [`core::app`] and [`ui::chat_loop`] for interactive sessions.

pub mod cli;
pub mod core;
pub mod logging;
pub mod ui;
pub mod utils;
