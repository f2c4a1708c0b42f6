//! Tutorial completion notifications.
//!
//! Listeners are registered on the state machine and called synchronously,
//! in registration order, when the tutorial first becomes completed. The
//! machine never waits on or inspects what a listener does.

use std::sync::mpsc::{self, Receiver};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Name of the completion event for consumers that route by name.
pub const TUTORIAL_COMPLETED_EVENT: &str = "tutorial-completed";

/// Payload delivered when the tutorial completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorialCompleted {
    pub completed_at: DateTime<Utc>,
    pub progress: u8,
}

/// Handle returned by registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn Fn(&TutorialCompleted)>;

/// Registered completion listeners.
#[derive(Default)]
pub struct CompletionListeners {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl CompletionListeners {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback.
    pub fn add(&mut self, listener: impl Fn(&TutorialCompleted) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Register a channel and return its receiving end.
    ///
    /// A dropped receiver is ignored.
    pub fn channel(&mut self) -> (ListenerId, Receiver<TutorialCompleted>) {
        let (tx, rx) = mpsc::channel();
        let id = self.add(move |event| {
            let _ = tx.send(event.clone());
        });
        (id, rx)
    }

    /// Unregister a listener. Returns whether it was registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every listener.
    pub fn emit(&self, event: &TutorialCompleted) {
        tracing::debug!(
            "Emitting {} to {} listeners",
            TUTORIAL_COMPLETED_EVENT,
            self.listeners.len()
        );
        for (_, listener) in &self.listeners {
            listener(event);
        }
    }
}

impl std::fmt::Debug for CompletionListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionListeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}
