//! Tutorial command implementation.
//!
//! Provides `questlog tutorial status`, `start`, `complete <step>`, `skip`,
//! and `reset`.

use std::rc::Rc;
use std::sync::mpsc::Receiver;

use clap::{Args, Subcommand};
use serde_json::json;

use crate::error::QuestlogError;
use crate::tutorial::{TutorialCompleted, TutorialStateMachine};
use crate::ui::{progress_bar, UserInterface};

use super::confirm_destructive;
use super::dispatcher::{AppContext, Command, CommandResult};

/// Arguments for the tutorial command.
#[derive(Debug, Clone, Args)]
pub struct TutorialArgs {
    #[command(subcommand)]
    pub command: TutorialSubcommand,
}

/// Tutorial subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum TutorialSubcommand {
    /// Show every step and overall progress.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Begin the tutorial.
    Start,
    /// Mark a step as done.
    Complete {
        /// Step id, e.g. `create_task`.
        id: String,
    },
    /// Skip the rest of the tutorial.
    Skip,
    /// Start over from scratch.
    Reset {
        /// Don't prompt for confirmation.
        #[arg(short, long)]
        force: bool,
    },
}

/// The tutorial command implementation.
pub struct TutorialCommand {
    context: AppContext,
    args: TutorialArgs,
}

impl TutorialCommand {
    /// Create a new tutorial command.
    pub fn new(context: AppContext, args: TutorialArgs) -> Self {
        Self { context, args }
    }
}

impl Command for TutorialCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> crate::error::Result<CommandResult> {
        let mut machine = TutorialStateMachine::new(Rc::clone(&self.context.store));
        let completed = machine.subscribe();

        let ok = match &self.args.command {
            TutorialSubcommand::Status { json } => show_status(&machine, *json, ui)?,
            TutorialSubcommand::Start => {
                if machine.start() {
                    ui.success("Tutorial started");
                    show_next(&machine, ui);
                } else {
                    ui.message("Tutorial already started");
                }
                true
            }
            TutorialSubcommand::Complete { id } => complete(&mut machine, id, ui)?,
            TutorialSubcommand::Skip => {
                let was_completed = machine.is_completed();
                let ok = machine.skip();
                if was_completed {
                    ui.message("Tutorial already completed");
                }
                ok
            }
            TutorialSubcommand::Reset { force } => {
                if !confirm_destructive(ui, *force, "Reset all tutorial progress?")? {
                    ui.message("Reset cancelled");
                    return Ok(CommandResult::failure(1));
                }
                let ok = machine.reset();
                if ok {
                    ui.success("Tutorial reset");
                }
                ok
            }
        };

        announce_completion(&completed, ui);
        Ok(CommandResult::from_bool(ok))
    }
}

fn show_status(
    machine: &TutorialStateMachine,
    json: bool,
    ui: &mut dyn UserInterface,
) -> crate::error::Result<bool> {
    if json {
        let steps: Vec<_> = machine
            .steps()
            .into_iter()
            .map(|s| {
                json!({
                    "id": s.id,
                    "title": s.title,
                    "completed": s.completed,
                    "required": s.required,
                })
            })
            .collect();
        let output = json!({
            "status": machine.status(),
            "progress": machine.progress(),
            "currentStep": machine.current_step(),
            "completedAt": machine.state().completed_at,
            "steps": steps,
        });
        ui.message(&serde_json::to_string_pretty(&output)?);
        return Ok(true);
    }

    let progress = machine.progress();
    ui.show_header("Tutorial");
    ui.message(&format!(
        "  {} {} {}%",
        machine.status().label(),
        progress_bar(progress, 20),
        progress
    ));
    ui.message("");
    for step in machine.steps() {
        let mark = if step.completed { "x" } else { " " };
        let pointer = if machine.current_step() == Some(step.id.as_str()) {
            ">"
        } else {
            " "
        };
        let optional = if step.required { "" } else { " (optional)" };
        ui.message(&format!(
            " {} [{}] {:<22} {}{}",
            pointer, mark, step.id, step.title, optional
        ));
    }
    Ok(true)
}

fn show_next(machine: &TutorialStateMachine, ui: &mut dyn UserInterface) {
    if let Some(step) = machine.current_step().and_then(|id| machine.step(id)) {
        ui.message(&format!(
            "Next: {} (`questlog tutorial complete {}`)",
            step.title, step.id
        ));
    }
}

fn complete(
    machine: &mut TutorialStateMachine,
    id: &str,
    ui: &mut dyn UserInterface,
) -> crate::error::Result<bool> {
    if machine.step(id).is_none() {
        let known: Vec<&str> = machine
            .template()
            .steps
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        ui.error(&format!("Known steps: {}", known.join(", ")));
        return Err(QuestlogError::UnknownStep { id: id.to_string() });
    }

    let already = machine.is_step_completed(id);
    machine.complete_step(id);
    if already {
        ui.message(&format!("Step '{}' was already done", id));
    } else {
        ui.success(&format!("Completed '{}' ({}%)", id, machine.progress()));
    }
    if !machine.is_completed() {
        show_next(machine, ui);
    }
    Ok(true)
}

fn announce_completion(events: &Receiver<TutorialCompleted>, ui: &mut dyn UserInterface) {
    for event in events.try_iter() {
        ui.success(&format!(
            "Tutorial complete! Finished at {}",
            event.completed_at.format("%Y-%m-%d %H:%M UTC")
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::storage::KeyValueStore;
    use crate::tutorial::TutorialStatus;
    use crate::ui::MockUI;

    fn context() -> AppContext {
        AppContext {
            config: AppConfig::default(),
            store: Rc::new(KeyValueStore::in_memory()),
        }
    }

    fn run(
        ctx: &AppContext,
        command: TutorialSubcommand,
        ui: &mut MockUI,
    ) -> crate::error::Result<CommandResult> {
        TutorialCommand::new(ctx.clone(), TutorialArgs { command }).execute(ui)
    }

    #[test]
    fn start_completes_welcome() {
        let ctx = context();
        let mut ui = MockUI::new();

        assert!(run(&ctx, TutorialSubcommand::Start, &mut ui).unwrap().success);
        assert_eq!(ui.successes(), ["Tutorial started"]);
        assert!(ui.messages()[0].contains("create_task"));

        let machine = TutorialStateMachine::new(Rc::clone(&ctx.store));
        assert!(machine.is_step_completed("welcome"));
    }

    #[test]
    fn second_start_is_a_no_op() {
        let ctx = context();
        run(&ctx, TutorialSubcommand::Start, &mut MockUI::new()).unwrap();

        let mut ui = MockUI::new();
        run(&ctx, TutorialSubcommand::Start, &mut ui).unwrap();
        assert_eq!(ui.messages(), ["Tutorial already started"]);
    }

    #[test]
    fn unknown_step_is_an_error() {
        let ctx = context();
        let mut ui = MockUI::new();

        let err = run(
            &ctx,
            TutorialSubcommand::Complete {
                id: "fly".to_string(),
            },
            &mut ui,
        )
        .unwrap_err();
        assert!(matches!(err, QuestlogError::UnknownStep { .. }));
        assert!(ui.errors()[0].contains("welcome"));
    }

    #[test]
    fn completing_required_steps_announces_once() {
        let ctx = context();
        for id in ["welcome", "create_task", "complete_task", "create_habit"] {
            let mut ui = MockUI::new();
            run(&ctx, TutorialSubcommand::Complete { id: id.to_string() }, &mut ui).unwrap();
            assert!(!ui.all_output().contains("Tutorial complete!"));
        }

        let mut ui = MockUI::new();
        run(
            &ctx,
            TutorialSubcommand::Complete {
                id: "completion".to_string(),
            },
            &mut ui,
        )
        .unwrap();
        assert!(ui.all_output().contains("Tutorial complete!"));

        let mut ui = MockUI::new();
        run(&ctx, TutorialSubcommand::Skip, &mut ui).unwrap();
        assert!(!ui.all_output().contains("Tutorial complete!"));
        assert_eq!(ui.messages(), ["Tutorial already completed"]);
    }

    #[test]
    fn skip_announces_completion() {
        let ctx = context();
        let mut ui = MockUI::new();

        assert!(run(&ctx, TutorialSubcommand::Skip, &mut ui).unwrap().success);
        assert!(ui.successes()[0].contains("Tutorial complete!"));
    }

    #[test]
    fn status_lists_steps() {
        let ctx = context();
        run(&ctx, TutorialSubcommand::Start, &mut MockUI::new()).unwrap();

        let mut ui = MockUI::new();
        run(&ctx, TutorialSubcommand::Status { json: false }, &mut ui).unwrap();

        assert_eq!(ui.headers(), ["Tutorial"]);
        let output = ui.all_output();
        assert!(output.contains("in progress"));
        assert!(output.contains("[x] welcome"));
        assert!(output.contains("> [ ] create_task"));
        assert!(output.contains("(optional)"));
    }

    #[test]
    fn json_status_keeps_template_order() {
        let ctx = context();
        let mut ui = MockUI::new();
        run(&ctx, TutorialSubcommand::Status { json: true }, &mut ui).unwrap();

        let value: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        assert_eq!(value["status"], "not_started");
        assert_eq!(value["steps"][0]["id"], "welcome");
        assert_eq!(value["steps"][6]["id"], "completion");
        assert!(value["completedAt"].is_null());
    }

    #[test]
    fn reset_needs_confirmation() {
        let ctx = context();
        run(&ctx, TutorialSubcommand::Skip, &mut MockUI::new()).unwrap();

        let refused = run(
            &ctx,
            TutorialSubcommand::Reset { force: false },
            &mut MockUI::new(),
        )
        .unwrap();
        assert!(!refused.success);
        assert!(TutorialStateMachine::new(Rc::clone(&ctx.store)).is_completed());

        let reset = run(
            &ctx,
            TutorialSubcommand::Reset { force: true },
            &mut MockUI::new(),
        )
        .unwrap();
        assert!(reset.success);
        assert_eq!(
            TutorialStateMachine::new(Rc::clone(&ctx.store)).status(),
            TutorialStatus::NotStarted
        );
    }
}
