//! Command-line interface for Questlog.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{ClearArgs, Cli, Commands, CompletionsArgs, StatusArgs, UsageArgs};
pub use commands::{AppContext, Command, CommandDispatcher, CommandResult};
