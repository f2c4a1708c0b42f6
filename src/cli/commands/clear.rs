//! Clear command implementation.
//!
//! Provides `questlog clear`, which removes every entity store. The backup
//! slot and tutorial progress are left alone.

use std::rc::Rc;

use crate::cli::args::ClearArgs;
use crate::repository::TypedRepository;
use crate::ui::UserInterface;

use super::confirm_destructive;
use super::dispatcher::{AppContext, Command, CommandResult};

/// The clear command implementation.
pub struct ClearCommand {
    context: AppContext,
    args: ClearArgs,
}

impl ClearCommand {
    /// Create a new clear command.
    pub fn new(context: AppContext, args: ClearArgs) -> Self {
        Self { context, args }
    }
}

impl Command for ClearCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> crate::error::Result<CommandResult> {
        let question = "Delete all tasks, habits, profile, and settings?";
        if !confirm_destructive(ui, self.args.force, question)? {
            ui.message("Nothing cleared");
            return Ok(CommandResult::failure(1));
        }

        let repo = TypedRepository::new(Rc::clone(&self.context.store));
        if repo.clear_all() {
            ui.success("Cleared all stored data");
            Ok(CommandResult::success())
        } else {
            ui.error("Some data could not be removed");
            Ok(CommandResult::failure(1))
        }
    }
}
