//! Usage command implementation.
//!
//! Provides `questlog usage`, the per-key byte breakdown against the
//! configured quota.

use crate::cli::args::UsageArgs;
use crate::storage::StorageKey;
use crate::ui::UserInterface;

use super::dispatcher::{AppContext, Command, CommandResult};
use super::format_bytes;

/// The usage command implementation.
pub struct UsageCommand {
    context: AppContext,
    args: UsageArgs,
}

impl UsageCommand {
    /// Create a new usage command.
    pub fn new(context: AppContext, args: UsageArgs) -> Self {
        Self { context, args }
    }
}

impl Command for UsageCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> crate::error::Result<CommandResult> {
        let usage = self
            .context
            .store
            .usage(&StorageKey::ALL, self.context.config.quota_bytes);

        if self.args.json {
            ui.message(&serde_json::to_string_pretty(&usage)?);
            return Ok(CommandResult::success());
        }

        ui.show_header("Storage usage");
        if usage.per_key.is_empty() {
            ui.message("  Nothing stored");
        }
        for entry in &usage.per_key {
            ui.message(&format!("  {:<28} {:>10}", entry.key, format_bytes(entry.bytes)));
        }
        ui.message("");
        ui.message(&format!(
            "  Used {} of {} ({:.2}%), {} free",
            format_bytes(usage.used_bytes),
            format_bytes(usage.quota_bytes),
            usage.percentage,
            format_bytes(usage.remaining_bytes())
        ));

        if usage.percentage >= 90.0 {
            ui.warning("Storage is almost full; export a backup and clear old data");
        }

        Ok(CommandResult::success())
    }
}
