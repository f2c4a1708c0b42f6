//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::rc::Rc;

use crate::cli::args::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::Result;
use crate::storage::KeyValueStore;
use crate::ui::UserInterface;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// Success or a failure with exit code 1.
    pub fn from_bool(ok: bool) -> Self {
        if ok {
            Self::success()
        } else {
            Self::failure(1)
        }
    }
}

/// Shared state handed to every command.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub store: Rc<KeyValueStore>,
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    context: AppContext,
}

impl CommandDispatcher {
    /// Open the configured store and create a dispatcher over it.
    pub fn new(config: AppConfig) -> Self {
        let store = Rc::new(config.open_store());
        Self::with_store(config, store)
    }

    /// Create a dispatcher over an already opened store.
    pub fn with_store(config: AppConfig, store: Rc<KeyValueStore>) -> Self {
        Self {
            context: AppContext { config, store },
        }
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if !self.context.store.is_available() && !matches!(cli.command, Commands::Completions(_)) {
            ui.warning("Storage is unavailable; nothing will be read or saved");
        }

        let ctx = self.context.clone();
        match &cli.command {
            Commands::Status(args) => {
                super::status::StatusCommand::new(ctx, args.clone()).execute(ui)
            }
            Commands::Usage(args) => super::usage::UsageCommand::new(ctx, args.clone()).execute(ui),
            Commands::Backup(args) => {
                super::backup::BackupCommand::new(ctx, args.clone()).execute(ui)
            }
            Commands::Tutorial(args) => {
                super::tutorial::TutorialCommand::new(ctx, args.clone()).execute(ui)
            }
            Commands::Clear(args) => super::clear::ClearCommand::new(ctx, args.clone()).execute(ui),
            Commands::Completions(args) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
        }
    }
}
