//! Backup command implementation.
//!
//! Provides `questlog backup create`, `backup restore`, `backup export`,
//! and friends on top of [`BackupManager`].

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;
use clap::{Args, Subcommand};

use crate::backup::{BackupManager, Snapshot};
use crate::ui::UserInterface;

use super::confirm_destructive;
use super::dispatcher::{AppContext, Command, CommandResult};

/// Arguments for the backup command.
#[derive(Debug, Clone, Args)]
pub struct BackupArgs {
    #[command(subcommand)]
    pub command: BackupSubcommand,
}

/// Backup subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum BackupSubcommand {
    /// Snapshot everything into the backup slot.
    Create,
    /// Describe the stored backup.
    Show,
    /// Restore the stored backup over the current data.
    Restore {
        /// Don't prompt for confirmation.
        #[arg(short, long)]
        force: bool,
    },
    /// Write the current data as JSON.
    Export {
        /// File to write (default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Restore data from an exported JSON file.
    Import {
        /// Exported file to read.
        file: PathBuf,
        /// Don't prompt for confirmation.
        #[arg(short, long)]
        force: bool,
    },
}

/// The backup command implementation.
pub struct BackupCommand {
    context: AppContext,
    args: BackupArgs,
}

impl BackupCommand {
    /// Create a new backup command.
    pub fn new(context: AppContext, args: BackupArgs) -> Self {
        Self { context, args }
    }
}

impl Command for BackupCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> crate::error::Result<CommandResult> {
        let manager = BackupManager::new(Rc::clone(&self.context.store));

        let ok = match &self.args.command {
            BackupSubcommand::Create => create_backup(&manager, ui),
            BackupSubcommand::Show => show_backup(&manager, ui),
            BackupSubcommand::Restore { force } => restore_backup(&manager, *force, ui)?,
            BackupSubcommand::Export { output } => export_backup(&manager, output.as_deref(), ui)?,
            BackupSubcommand::Import { file, force } => import_backup(&manager, file, *force, ui)?,
        };

        Ok(CommandResult::from_bool(ok))
    }
}

fn describe(snapshot: &Snapshot) -> String {
    let count = |items: Option<usize>| items.map_or("-".to_string(), |n| n.to_string());
    format!(
        "{} tasks, {} habits, profile {}, settings {}",
        count(snapshot.tasks.as_ref().map(Vec::len)),
        count(snapshot.habits.as_ref().map(Vec::len)),
        if snapshot.user.is_some() { "yes" } else { "no" },
        if snapshot.settings.is_some() { "yes" } else { "no" },
    )
}

fn create_backup(manager: &BackupManager, ui: &mut dyn UserInterface) -> bool {
    match manager.backup_now() {
        Some(snapshot) => {
            ui.success(&format!("Backup saved ({})", describe(&snapshot)));
            true
        }
        None => {
            ui.error("Could not save the backup");
            false
        }
    }
}

fn show_backup(manager: &BackupManager, ui: &mut dyn UserInterface) -> bool {
    let Some(snapshot) = manager.load_named_backup() else {
        ui.message("No backup stored");
        return true;
    };

    ui.show_header("Last backup");
    ui.message(&format!(
        "  Taken: {}",
        snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    ui.message(&format!("  Version: {}", snapshot.version));
    ui.message(&format!("  Contents: {}", describe(&snapshot)));
    true
}

fn restore_backup(
    manager: &BackupManager,
    force: bool,
    ui: &mut dyn UserInterface,
) -> crate::error::Result<bool> {
    let Some(snapshot) = manager.load_named_backup() else {
        ui.error("No backup stored; run `questlog backup create` first");
        return Ok(false);
    };

    let question = format!(
        "Replace current data with the backup from {}?",
        snapshot.timestamp.format("%Y-%m-%d %H:%M")
    );
    if !confirm_destructive(ui, force, &question)? {
        ui.message("Restore cancelled");
        return Ok(false);
    }

    if manager.restore(&snapshot) {
        ui.success("Backup restored");
        Ok(true)
    } else {
        ui.error("Restore stopped part way; some data may already be replaced");
        Ok(false)
    }
}

fn export_backup(
    manager: &BackupManager,
    output: Option<&Path>,
    ui: &mut dyn UserInterface,
) -> crate::error::Result<bool> {
    let snapshot = manager.create_snapshot();
    let text = manager.export_text(&snapshot);

    match output {
        Some(path) => {
            fs::write(path, &text)
                .with_context(|| format!("Failed to write export to {}", path.display()))?;
            ui.success(&format!("Exported {} to {}", describe(&snapshot), path.display()));
        }
        None => ui.message(&text),
    }
    Ok(true)
}

fn import_backup(
    manager: &BackupManager,
    file: &Path,
    force: bool,
    ui: &mut dyn UserInterface,
) -> crate::error::Result<bool> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let Some(snapshot) = BackupManager::parse_text(&text) else {
        ui.error(&format!("{} is not a Questlog export", file.display()));
        return Ok(false);
    };

    let question = format!("Import {} over the current data?", describe(&snapshot));
    if !confirm_destructive(ui, force, &question)? {
        ui.message("Import cancelled");
        return Ok(false);
    }

    if manager.restore(&snapshot) {
        ui.success(&format!("Imported {}", file.display()));
        Ok(true)
    } else {
        ui.error("Import stopped part way; some data may already be replaced");
        Ok(false)
    }
}
