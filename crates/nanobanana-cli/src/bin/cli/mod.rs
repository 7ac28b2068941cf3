//! Terminal front end for the Nano Banana workflow
//!
//! - `args`: clap definitions for the binary
//! - `commands`: line commands of the interactive session
//! - `session`: the interactive wizard loop
//! - `oneshot`: the `run` and `history` subcommands

pub mod args;
pub mod clipboard;
pub mod commands;
pub mod context;
pub mod oneshot;
pub mod render;
pub mod session;

pub use args::{Cli, Commands};
