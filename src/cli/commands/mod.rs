//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait and is routed by the
//! [`CommandDispatcher`], which opens the configured store once and hands
//! every command the same [`AppContext`].

pub mod backup;
pub mod clear;
pub mod completions;
pub mod dispatcher;
pub mod status;
pub mod tutorial;
pub mod usage;

pub use dispatcher::{AppContext, Command, CommandDispatcher, CommandResult};

use crate::error::Result;
use crate::ui::UserInterface;

/// Decide whether a destructive action may proceed.
///
/// `--force` always proceeds. Otherwise an interactive terminal is asked and
/// a non-interactive one is refused.
pub fn confirm_destructive(
    ui: &mut dyn UserInterface,
    force: bool,
    question: &str,
) -> Result<bool> {
    if force {
        return Ok(true);
    }
    if !ui.is_interactive() {
        ui.error("Refusing to continue without a terminal; pass --force");
        return Ok(false);
    }
    ui.confirm(question, false)
}

/// Format a byte count for display.
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let value = bytes as f64;
    if value >= MB {
        format!("{:.1} MB", value / MB)
    } else if value >= KB {
        format!("{:.1} KB", value / KB)
    } else {
        format!("{} B", bytes)
    }
}
