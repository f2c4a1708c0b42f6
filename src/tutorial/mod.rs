//! Onboarding tutorial progression.
//!
//! The tutorial is a fixed, ordered list of steps described by a
//! [`TutorialTemplate`]. Progress is stored as a [`TutorialState`] under
//! its own storage key and driven by the [`TutorialStateMachine`].
//!
//! # Lifecycle
//!
//! ```text
//! NotStarted --start()--> InProgress --last required step--> Completed
//!      \                                                       ^
//!       `-------------------------skip()----------------------'
//! ```
//!
//! `reset()` returns any state to NotStarted. A completed step stays
//! completed until a reset.

pub mod events;
pub mod machine;
pub mod migration;

pub use events::{CompletionListeners, ListenerId, TutorialCompleted, TUTORIAL_COMPLETED_EVENT};
pub use machine::TutorialStateMachine;
pub use migration::{migrate, Migrated};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A step as declared by the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinition {
    pub id: String,
    pub title: String,
    pub required: bool,
}

impl StepDefinition {
    /// A step that must be completed to finish the tutorial.
    pub fn required(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            required: true,
        }
    }

    /// A step that does not block completion.
    pub fn optional(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(id, title)
        }
    }
}

/// The ordered step list and the schema version it belongs to.
///
/// Bump `version` whenever steps are added, removed, or renamed so that
/// stored progress is migrated on the next load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorialTemplate {
    pub version: u32,
    pub steps: Vec<StepDefinition>,
}

impl Default for TutorialTemplate {
    fn default() -> Self {
        Self {
            version: 1,
            steps: vec![
                StepDefinition::required("welcome", "Welcome to Questlog"),
                StepDefinition::required("create_task", "Create your first task"),
                StepDefinition::required("complete_task", "Complete a task"),
                StepDefinition::required("create_habit", "Start a habit"),
                StepDefinition::optional("view_stats", "Check your stats"),
                StepDefinition::optional("explore_achievements", "Browse achievements"),
                StepDefinition::required("completion", "You're all set"),
            ],
        }
    }
}

impl TutorialTemplate {
    /// Create a template from its steps.
    pub fn new(version: u32, steps: Vec<StepDefinition>) -> Self {
        Self { version, steps }
    }

    /// Id of the first step.
    pub fn first(&self) -> Option<&str> {
        self.steps.first().map(|s| s.id.as_str())
    }

    /// Id of the step after `id` in the fixed order.
    pub fn next_after(&self, id: &str) -> Option<&str> {
        let index = self.steps.iter().position(|s| s.id == id)?;
        self.steps.get(index + 1).map(|s| s.id.as_str())
    }

    /// Whether `id` is part of the template.
    pub fn contains(&self, id: &str) -> bool {
        self.steps.iter().any(|s| s.id == id)
    }

    /// A fresh, untouched state for this template.
    pub fn initial_state(&self) -> TutorialState {
        TutorialState {
            version: self.version,
            completed: false,
            current_step: None,
            steps: self
                .steps
                .iter()
                .map(|def| {
                    (
                        def.id.clone(),
                        TutorialStep {
                            id: def.id.clone(),
                            title: def.title.clone(),
                            completed: false,
                            required: def.required,
                        },
                    )
                })
                .collect(),
            completed_at: None,
        }
    }
}

/// Persisted progress of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorialStep {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub required: bool,
}

/// Persisted tutorial progress.
///
/// Steps are keyed by id; their order comes from the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorialState {
    /// Template version this state was written for.
    #[serde(default)]
    pub version: u32,
    pub completed: bool,
    pub current_step: Option<String>,
    pub steps: BTreeMap<String, TutorialStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Whole-tutorial status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TutorialStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl TutorialStatus {
    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            TutorialStatus::NotStarted => "not started",
            TutorialStatus::InProgress => "in progress",
            TutorialStatus::Completed => "completed",
        }
    }
}

impl TutorialState {
    /// Derive the whole-tutorial status.
    pub fn status(&self) -> TutorialStatus {
        if self.completed {
            TutorialStatus::Completed
        } else if self.steps.values().any(|s| s.completed) {
            TutorialStatus::InProgress
        } else {
            TutorialStatus::NotStarted
        }
    }

    /// Whether every required step is completed.
    pub fn all_required_completed(&self) -> bool {
        self.steps
            .values()
            .filter(|s| s.required)
            .all(|s| s.completed)
    }
}
