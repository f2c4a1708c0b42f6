//! Host key-value storage.
//!
//! Everything Questlog persists lives under a small, fixed set of string
//! keys in a [`StorageBackend`]. The [`KeyValueStore`] wraps a backend with
//! a one-time availability probe and JSON encoding, and turns every
//! failure into a `false`/`None` return.
//!
//! - [`backend`] - backend trait plus the memory and file implementations
//! - [`kv`] - the JSON-encoding store wrapper
//! - [`usage`] - byte accounting across the known keys

pub mod backend;
pub mod kv;
pub mod usage;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use kv::KeyValueStore;
pub use usage::{KeyUsage, StorageUsage, DEFAULT_QUOTA_BYTES};

use std::fmt;

/// The persisted key layout.
///
/// These names are part of the on-disk format and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Tasks,
    Habits,
    User,
    Achievements,
    Settings,
    LastBackup,
    TutorialState,
    CustomCategories,
}

impl StorageKey {
    /// Every key Questlog owns, in display order.
    pub const ALL: [StorageKey; 8] = [
        StorageKey::Tasks,
        StorageKey::Habits,
        StorageKey::User,
        StorageKey::Achievements,
        StorageKey::Settings,
        StorageKey::LastBackup,
        StorageKey::TutorialState,
        StorageKey::CustomCategories,
    ];

    /// Keys holding user entity data (cleared by a full data wipe).
    pub const ENTITIES: [StorageKey; 6] = [
        StorageKey::Tasks,
        StorageKey::Habits,
        StorageKey::User,
        StorageKey::Achievements,
        StorageKey::Settings,
        StorageKey::CustomCategories,
    ];

    /// The string key used in the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::Tasks => "questlog_tasks",
            StorageKey::Habits => "questlog_habits",
            StorageKey::User => "questlog_user",
            StorageKey::Achievements => "questlog_achievements",
            StorageKey::Settings => "questlog_settings",
            StorageKey::LastBackup => "questlog_last_backup",
            StorageKey::TutorialState => "questlog_tutorial",
            StorageKey::CustomCategories => "questlog_custom_categories",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
