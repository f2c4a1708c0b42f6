//! Status command implementation.
//!
//! Provides `questlog status`: an overview of what is stored and how far
//! the tutorial has progressed.

use std::rc::Rc;

use serde_json::json;

use crate::backup::BackupManager;
use crate::cli::args::StatusArgs;
use crate::repository::TypedRepository;
use crate::tutorial::{TutorialStateMachine, TutorialStatus};
use crate::ui::{progress_bar, UserInterface};

use super::dispatcher::{AppContext, Command, CommandResult};
use super::format_bytes;

/// The status command implementation.
pub struct StatusCommand {
    context: AppContext,
    args: StatusArgs,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(context: AppContext, args: StatusArgs) -> Self {
        Self { context, args }
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> crate::error::Result<CommandResult> {
        let store = Rc::clone(&self.context.store);
        let repo = TypedRepository::new(Rc::clone(&store));
        let backups = BackupManager::new(Rc::clone(&store));
        let tutorial = TutorialStateMachine::new(store);

        let tasks = repo.get_tasks();
        let habits = repo.get_habits();
        let achievements = repo.get_achievements();
        let unlocked = achievements.iter().filter(|a| a.is_unlocked()).count();
        let user = repo.get_user();
        let settings = repo.settings_or_default();
        let last_backup = backups.load_named_backup().map(|s| s.timestamp);
        let usage = repo.storage_usage(self.context.config.quota_bytes);

        if self.args.json {
            let output = json!({
                "available": self.context.store.is_available(),
                "tasks": tasks.len(),
                "completedTasks": tasks.iter().filter(|t| t.completed).count(),
                "habits": habits.len(),
                "achievements": { "unlocked": unlocked, "total": achievements.len() },
                "user": user.as_ref().map(|u| json!({ "name": u.name, "level": u.level })),
                "theme": settings.theme,
                "lastBackup": last_backup,
                "usedBytes": usage.used_bytes,
                "tutorial": {
                    "status": tutorial.status(),
                    "progress": tutorial.progress(),
                    "currentStep": tutorial.current_step(),
                },
            });
            ui.message(&serde_json::to_string_pretty(&output)?);
            return Ok(CommandResult::success());
        }

        ui.show_header("Questlog");

        match &user {
            Some(u) => ui.message(&format!("  Player: {} (level {})", u.name, u.level)),
            None => ui.message("  Player: none"),
        }
        let done = tasks.iter().filter(|t| t.completed).count();
        ui.message(&format!("  Tasks: {} ({} completed)", tasks.len(), done));
        ui.message(&format!("  Habits: {}", habits.len()));
        if !achievements.is_empty() {
            ui.message(&format!(
                "  Achievements: {} of {} unlocked",
                unlocked,
                achievements.len()
            ));
        }
        ui.message(&format!(
            "  Storage: {} ({:.2}%)",
            format_bytes(usage.used_bytes),
            usage.percentage
        ));
        match last_backup {
            Some(at) => ui.message(&format!(
                "  Last backup: {}",
                at.format("%Y-%m-%d %H:%M:%S UTC")
            )),
            None => ui.message("  Last backup: never"),
        }

        let progress = tutorial.progress();
        ui.message(&format!(
            "  Tutorial: {} {} {}%",
            tutorial.status().label(),
            progress_bar(progress, 20),
            progress
        ));
        let next = match tutorial.status() {
            TutorialStatus::NotStarted => tutorial.template().first(),
            _ => tutorial.current_step(),
        };
        if let Some(step) = next.and_then(|id| tutorial.step(id)) {
            ui.message(&format!("  Next step: {} ({})", step.title, step.id));
        }

        Ok(CommandResult::success())
    }
}
