//! Questlog - local persistence and onboarding for a gamified productivity
//! tracker.
//!
//! Everything a user creates (tasks, habits, their profile, settings) is kept
//! as JSON text in a quota-limited key-value store. On top of that store sit
//! typed accessors, whole-dataset backups, and a small tutorial state
//! machine that walks new users through the app.
//!
//! # Modules
//!
//! - [`storage`] - Key-value store, backends, and usage accounting
//! - [`model`] - The persisted domain records
//! - [`repository`] - Typed, tolerant access to each entity store
//! - [`backup`] - Snapshots, restore, and JSON export/import
//! - [`tutorial`] - Onboarding tutorial progression
//! - [`config`] - Data directory, quota, and backend selection
//! - [`cli`] - Command-line interface
//! - [`ui`] - Terminal output and prompts
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use questlog::{BackupManager, KeyValueStore, Task, TypedRepository};
//!
//! let store = Rc::new(KeyValueStore::in_memory());
//! let repo = TypedRepository::new(Rc::clone(&store));
//! assert!(repo.set_tasks(&[Task::new("t1", "Write the report")]));
//!
//! let backups = BackupManager::new(store);
//! let snapshot = backups.create_snapshot();
//! assert_eq!(snapshot.tasks.map(|t| t.len()), Some(1));
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod storage;
pub mod tutorial;
pub mod ui;

pub use backup::{BackupManager, Snapshot};
pub use error::{QuestlogError, Result};
pub use model::{Habit, Settings, Task, User};
pub use repository::TypedRepository;
pub use storage::{KeyValueStore, StorageKey};
pub use tutorial::{TutorialStateMachine, TutorialStatus};
