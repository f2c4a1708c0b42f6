//! Load-time migration of stored tutorial progress.
//!
//! Stored state carries the template `version` it was written for (states
//! written before versioning have none and count as version 0). A state
//! whose version and step ids match the template is used as-is. Anything
//! else is rebuilt from the template:
//!
//! - steps in the template keep their stored `completed` flag
//! - steps new to the template start pending
//! - steps no longer in the template are dropped
//! - titles and required flags always come from the template
//! - the tutorial's own `completed` flag and timestamp are carried over
//!
//! The result is stamped with the template version so the migration runs
//! once.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{TutorialState, TutorialTemplate};

/// Outcome of [`migrate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Migrated {
    pub state: TutorialState,
    /// Whether the state was rebuilt and should be written back.
    pub migrated: bool,
}

/// Bring stored tutorial JSON in line with `template`.
///
/// Returns `None` when `raw` is not an object at all.
pub fn migrate(raw: Value, template: &TutorialTemplate) -> Option<Migrated> {
    if !raw.is_object() {
        return None;
    }

    let stored_version = raw.get("version").and_then(Value::as_u64).unwrap_or(0);
    if stored_version == u64::from(template.version) {
        if let Ok(state) = serde_json::from_value::<TutorialState>(raw.clone()) {
            if matches_template(&state, template) {
                return Some(Migrated {
                    state,
                    migrated: false,
                });
            }
        }
    }

    tracing::info!(
        "Migrating tutorial state from version {} to {}",
        stored_version,
        template.version
    );
    Some(Migrated {
        state: rebuild(&raw, template),
        migrated: true,
    })
}

fn matches_template(state: &TutorialState, template: &TutorialTemplate) -> bool {
    let ids_match = state.steps.len() == template.steps.len()
        && template.steps.iter().all(|s| state.steps.contains_key(&s.id));
    let current_ok = match &state.current_step {
        Some(id) => !state.completed && template.contains(id),
        None => true,
    };
    ids_match && current_ok
}

fn rebuild(raw: &Value, template: &TutorialTemplate) -> TutorialState {
    let mut state = template.initial_state();

    for step in state.steps.values_mut() {
        step.completed = raw
            .pointer(&format!("/steps/{}/completed", escape_pointer(&step.id)))
            .and_then(Value::as_bool)
            .unwrap_or(false);
    }

    state.completed = raw
        .get("completed")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if state.completed {
        state.completed_at = raw
            .get("completedAt")
            .cloned()
            .and_then(|v| serde_json::from_value::<DateTime<Utc>>(v).ok());
        state.current_step = None;
        return state;
    }

    let stored_current = raw
        .get("currentStep")
        .and_then(Value::as_str)
        .filter(|id| template.contains(id));

    state.current_step = match stored_current {
        Some(id) => Some(id.to_string()),
        None if state.steps.values().any(|s| s.completed) => template
            .steps
            .iter()
            .find(|def| !state.steps[&def.id].completed)
            .map(|def| def.id.clone()),
        None => None,
    };

    state
}

/// Escape a step id for use as a JSON pointer segment.
fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
