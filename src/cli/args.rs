//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use super::commands::backup::BackupArgs;
use super::commands::tutorial::TutorialArgs;

/// Questlog - local productivity tracker storage and onboarding.
#[derive(Debug, Parser)]
#[command(name = "questlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding stored data (default: .questlog)
    #[arg(short, long, global = true, env = "QUESTLOG_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to config file (default: <data-dir>/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show an overview of stored data and tutorial progress
    Status(StatusArgs),

    /// Show storage usage per key
    Usage(UsageArgs),

    /// Create, restore, export, and import backups
    Backup(BackupArgs),

    /// Drive the onboarding tutorial
    Tutorial(TutorialArgs),

    /// Delete all tasks, habits, profile, and settings
    Clear(ClearArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `usage` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct UsageArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `clear` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ClearArgs {
    /// Don't prompt for confirmation
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["questlog", "status", "--json", "--data-dir", "/tmp/q"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/q")));
        match cli.command {
            Commands::Status(args) => assert!(args.json),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_clear_force() {
        let cli = Cli::parse_from(["questlog", "clear", "-f"]);
        assert!(matches!(cli.command, Commands::Clear(ClearArgs { force: true })));
    }
}
