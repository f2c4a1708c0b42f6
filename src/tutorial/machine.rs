//! The tutorial state machine.

use std::rc::Rc;
use std::sync::mpsc::Receiver;

use chrono::Utc;
use serde_json::Value;

use super::events::{CompletionListeners, ListenerId, TutorialCompleted};
use super::migration::migrate;
use super::{TutorialState, TutorialStatus, TutorialStep, TutorialTemplate};
use crate::storage::{KeyValueStore, StorageKey};

/// Drives tutorial progress and persists it after every change.
///
/// Completion is checked after each step: once every required step is
/// done the tutorial is marked completed, stamped, saved, and announced to
/// the registered listeners exactly once.
pub struct TutorialStateMachine {
    store: Rc<KeyValueStore>,
    template: TutorialTemplate,
    state: TutorialState,
    listeners: CompletionListeners,
}

impl TutorialStateMachine {
    /// Load the machine for the default template.
    pub fn new(store: Rc<KeyValueStore>) -> Self {
        Self::with_template(store, TutorialTemplate::default())
    }

    /// Load the machine for `template`.
    ///
    /// Stored progress is migrated if it was written for another template
    /// version. When nothing usable is stored, a fresh state is created
    /// and saved.
    pub fn with_template(store: Rc<KeyValueStore>, template: TutorialTemplate) -> Self {
        let stored = store
            .get::<Value>(StorageKey::TutorialState.as_str())
            .and_then(|raw| migrate(raw, &template));

        let (state, needs_save) = match stored {
            Some(result) => (result.state, result.migrated),
            None => (template.initial_state(), true),
        };

        let machine = Self {
            store,
            template,
            state,
            listeners: CompletionListeners::new(),
        };
        if needs_save {
            machine.persist();
        }
        machine
    }

    /// The current persisted state.
    pub fn state(&self) -> &TutorialState {
        &self.state
    }

    /// The step template.
    pub fn template(&self) -> &TutorialTemplate {
        &self.template
    }

    /// Whole-tutorial status.
    pub fn status(&self) -> TutorialStatus {
        self.state.status()
    }

    /// Whether the tutorial is completed.
    pub fn is_completed(&self) -> bool {
        self.state.completed
    }

    /// Id of the step to show next.
    pub fn current_step(&self) -> Option<&str> {
        self.state.current_step.as_deref()
    }

    /// Steps in template order.
    pub fn steps(&self) -> Vec<&TutorialStep> {
        self.template
            .steps
            .iter()
            .filter_map(|def| self.state.steps.get(&def.id))
            .collect()
    }

    /// Look up a step by id.
    pub fn step(&self, id: &str) -> Option<&TutorialStep> {
        self.state.steps.get(id)
    }

    /// Whether step `id` is completed. Unknown ids are not.
    pub fn is_step_completed(&self, id: &str) -> bool {
        self.step(id).is_some_and(|s| s.completed)
    }

    /// Whether step `id` should be shown: it is current and not yet done.
    pub fn should_show_step(&self, id: &str) -> bool {
        self.current_step() == Some(id) && !self.is_step_completed(id)
    }

    /// Percentage of required steps completed, rounded.
    pub fn progress(&self) -> u8 {
        if self.state.completed {
            return 100;
        }
        let required: Vec<_> = self.state.steps.values().filter(|s| s.required).collect();
        if required.is_empty() {
            return 0;
        }
        let done = required.iter().filter(|s| s.completed).count();
        (done as f64 * 100.0 / required.len() as f64).round() as u8
    }

    /// Begin the tutorial: complete the first step and point at the second.
    ///
    /// Only acts when the tutorial has not started; returns whether it did.
    pub fn start(&mut self) -> bool {
        if self.status() != TutorialStatus::NotStarted {
            tracing::debug!("Tutorial already started, ignoring start");
            return false;
        }
        let Some(first) = self.template.first().map(str::to_string) else {
            return false;
        };

        self.mark_completed(&first);
        self.state.current_step = self.template.next_after(&first).map(str::to_string);
        self.persist();
        self.check_completion();
        true
    }

    /// Mark step `id` completed and advance past it.
    ///
    /// Returns `false`, changing nothing, when `id` is not a known step.
    pub fn complete_step(&mut self, id: &str) -> bool {
        if !self.state.steps.contains_key(id) {
            tracing::warn!("Ignoring unknown tutorial step '{}'", id);
            return false;
        }

        self.mark_completed(id);
        if !self.state.completed {
            self.state.current_step = self.template.next_after(id).map(str::to_string);
        }
        self.persist();
        self.check_completion();
        true
    }

    /// Complete every step and finish the tutorial.
    pub fn skip(&mut self) -> bool {
        for step in self.state.steps.values_mut() {
            step.completed = true;
        }
        if self.state.completed {
            return self.persist();
        }
        self.finish()
    }

    /// Return to a fresh, not-started state.
    pub fn reset(&mut self) -> bool {
        self.state = self.template.initial_state();
        tracing::info!("Tutorial reset");
        self.persist()
    }

    /// Register a completion callback.
    pub fn on_complete(&mut self, listener: impl Fn(&TutorialCompleted) + 'static) -> ListenerId {
        self.listeners.add(listener)
    }

    /// Receive completion events over a channel.
    pub fn subscribe(&mut self) -> Receiver<TutorialCompleted> {
        self.listeners.channel().1
    }

    /// Unregister a completion callback.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn mark_completed(&mut self, id: &str) {
        if let Some(step) = self.state.steps.get_mut(id) {
            step.completed = true;
        }
    }

    fn check_completion(&mut self) {
        if !self.state.completed && self.state.all_required_completed() {
            self.finish();
        }
    }

    fn finish(&mut self) -> bool {
        let completed_at = Utc::now();
        self.state.completed = true;
        self.state.current_step = None;
        self.state.completed_at = Some(completed_at);
        let saved = self.persist();

        tracing::info!("Tutorial completed");
        self.listeners.emit(&TutorialCompleted {
            completed_at,
            progress: 100,
        });
        saved
    }

    fn persist(&self) -> bool {
        let saved = self
            .store
            .set(StorageKey::TutorialState.as_str(), &self.state);
        if !saved {
            tracing::warn!("Tutorial progress could not be saved");
        }
        saved
    }
}

impl std::fmt::Debug for TutorialStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TutorialStateMachine")
            .field("state", &self.state)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use crate::tutorial::StepDefinition;
    use std::cell::Cell;

    fn abc() -> TutorialTemplate {
        TutorialTemplate::new(
            1,
            vec![
                StepDefinition::required("A", "Step A"),
                StepDefinition::required("B", "Step B"),
                StepDefinition::required("C", "Step C"),
            ],
        )
    }

    fn machine(template: TutorialTemplate) -> (Rc<KeyValueStore>, TutorialStateMachine) {
        let store = Rc::new(KeyValueStore::in_memory());
        let machine = TutorialStateMachine::with_template(Rc::clone(&store), template);
        (store, machine)
    }

    fn count_completions(machine: &mut TutorialStateMachine) -> Rc<Cell<u32>> {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        machine.on_complete(move |event| {
            assert_eq!(event.progress, 100);
            counter.set(counter.get() + 1);
        });
        hits
    }

    #[test]
    fn fresh_machine_is_not_started_and_saved() {
        let (store, machine) = machine(abc());
        assert_eq!(machine.status(), TutorialStatus::NotStarted);
        assert_eq!(machine.progress(), 0);
        assert!(machine.current_step().is_none());
        assert!(store.get_raw(StorageKey::TutorialState.as_str()).is_some());
    }

    #[test]
    fn walkthrough_matches_example() {
        let (_store, mut machine) = machine(abc());
        let hits = count_completions(&mut machine);

        assert!(machine.start());
        assert!(machine.is_step_completed("A"));
        assert_eq!(machine.current_step(), Some("B"));

        let before = machine.state().clone();
        assert!(!machine.complete_step("Z"));
        assert_eq!(machine.state(), &before);

        assert!(machine.complete_step("B"));
        assert_eq!(machine.current_step(), Some("C"));
        assert_eq!(machine.progress(), 67);

        assert!(machine.complete_step("C"));
        assert!(machine.is_completed());
        assert!(machine.current_step().is_none());
        assert!(machine.state().completed_at.is_some());
        assert_eq!(machine.progress(), 100);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn start_twice_is_a_no_op() {
        let (_store, mut machine) = machine(abc());
        assert!(machine.start());
        machine.complete_step("B");

        assert!(!machine.start());
        assert_eq!(machine.current_step(), Some("C"));
    }

    #[test]
    fn should_show_only_current_incomplete_step() {
        let (_store, mut machine) = machine(abc());
        assert!(!machine.should_show_step("A"));

        machine.start();
        assert!(machine.should_show_step("B"));
        assert!(!machine.should_show_step("C"));

        machine.complete_step("B");
        assert!(!machine.should_show_step("B"));
        assert!(machine.should_show_step("C"));
    }

    #[test]
    fn completing_out_of_order_still_finishes() {
        let (_store, mut machine) = machine(abc());
        let hits = count_completions(&mut machine);

        machine.complete_step("C");
        assert!(!machine.is_completed());
        assert!(machine.current_step().is_none());

        machine.complete_step("A");
        machine.complete_step("B");
        assert!(machine.is_completed());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn optional_steps_do_not_block_completion() {
        let template = TutorialTemplate::new(
            1,
            vec![
                StepDefinition::required("A", "A"),
                StepDefinition::optional("tip", "Tip"),
                StepDefinition::required("B", "B"),
            ],
        );
        let (_store, mut machine) = machine(template);

        machine.start();
        assert_eq!(machine.progress(), 50);
        machine.complete_step("B");
        assert!(machine.is_completed());
        assert!(!machine.is_step_completed("tip"));
    }

    #[test]
    fn completion_broadcast_fires_once() {
        let (_store, mut machine) = machine(abc());
        let hits = count_completions(&mut machine);

        machine.skip();
        machine.complete_step("A");
        machine.skip();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn skip_completes_from_any_state() {
        let (_store, mut machine) = machine(abc());
        machine.start();

        assert!(machine.skip());
        assert!(machine.is_completed());
        assert_eq!(machine.progress(), 100);
        assert!(machine.steps().iter().all(|s| s.completed));
    }

    #[test]
    fn reset_matches_fresh_machine() {
        let (store, mut machine) = machine(abc());
        machine.start();
        machine.skip();

        assert!(machine.reset());
        let fresh = TutorialStateMachine::with_template(
            Rc::new(KeyValueStore::in_memory()),
            abc(),
        );
        assert_eq!(machine.state(), fresh.state());

        let reloaded = TutorialStateMachine::with_template(store, abc());
        assert_eq!(reloaded.state(), fresh.state());
    }

    #[test]
    fn progress_survives_reload() {
        let (store, mut machine) = machine(abc());
        machine.start();
        machine.complete_step("B");

        let reloaded = TutorialStateMachine::with_template(store, abc());
        assert_eq!(reloaded.current_step(), Some("C"));
        assert!(reloaded.is_step_completed("A"));
        assert!(reloaded.is_step_completed("B"));
    }

    #[test]
    fn adding_a_step_keeps_earlier_progress() {
        let (store, mut machine) = machine(abc());
        machine.start();

        let mut steps = abc().steps;
        steps.insert(1, StepDefinition::required("A2", "Step A2"));
        let upgraded = TutorialStateMachine::with_template(store, TutorialTemplate::new(2, steps));

        assert!(upgraded.is_step_completed("A"));
        assert!(!upgraded.is_step_completed("A2"));
        assert_eq!(upgraded.state().version, 2);
        assert_eq!(upgraded.current_step(), Some("B"));
    }

    #[test]
    fn subscriber_channel_receives_completion() {
        let (_store, mut machine) = machine(abc());
        let rx = machine.subscribe();

        machine.skip();
        let event = rx.try_recv().unwrap();
        assert_eq!(event.progress, 100);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn removed_listener_is_silent() {
        let (_store, mut machine) = machine(abc());
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let id = machine.on_complete(move |_| counter.set(counter.get() + 1));

        assert!(machine.remove_listener(id));
        machine.skip();
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn unavailable_storage_still_tracks_in_memory() {
        let store = Rc::new(KeyValueStore::new(MemoryBackend::unavailable()));
        let mut machine = TutorialStateMachine::with_template(store, abc());

        assert!(machine.start());
        assert_eq!(machine.current_step(), Some("B"));
        assert!(!machine.skip());
        assert!(machine.is_completed());
    }

    #[test]
    fn corrupt_stored_state_starts_fresh() {
        let store = Rc::new(KeyValueStore::in_memory());
        store.set_raw(StorageKey::TutorialState.as_str(), "{{{");

        let machine = TutorialStateMachine::with_template(Rc::clone(&store), abc());
        assert_eq!(machine.status(), TutorialStatus::NotStarted);
        assert!(store
            .get::<TutorialState>(StorageKey::TutorialState.as_str())
            .is_some());
    }
}
