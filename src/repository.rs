//! Typed per-entity accessors.
//!
//! Each read goes through the same steps: fetch the raw JSON, decode each
//! record on its own, and drop the ones that fail the shape check.
//! Collections are filtered record by record, so one corrupted task never
//! takes its siblings down with it. Singletons come back as `None` when they
//! fail. A payload that is not JSON at all reads as "no data".
//!
//! Writes are trusted and go straight through.

use std::rc::Rc;

use serde_json::Value;

use crate::model::{Achievement, Habit, Record, Settings, Task, User};
use crate::storage::{KeyValueStore, StorageKey, StorageUsage};

/// Decode one record, logging and returning `None` when it fails.
pub(crate) fn decode_record<T: Record>(context: &str, value: Value) -> Option<T> {
    match serde_json::from_value::<T>(value) {
        Ok(record) if record.is_well_formed() => Some(record),
        Ok(_) => {
            tracing::warn!("Dropping malformed {} in '{}'", T::KIND, context);
            None
        }
        Err(e) => {
            tracing::warn!("Dropping invalid {} in '{}': {}", T::KIND, context, e);
            None
        }
    }
}

/// Decode a JSON array record by record, keeping the valid ones.
///
/// Anything other than an array decodes to an empty list.
pub(crate) fn decode_collection<T: Record>(context: &str, value: Value) -> Vec<T> {
    let Value::Array(items) = value else {
        if !value.is_null() {
            tracing::warn!("Expected a {} list in '{}', ignoring it", T::KIND, context);
        }
        return Vec::new();
    };

    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .filter_map(|item| decode_record(context, item))
        .collect();

    if records.len() < total {
        tracing::warn!(
            "Kept {} of {} {} records from '{}'",
            records.len(),
            total,
            T::KIND,
            context
        );
    }
    records
}

/// Typed access to every entity store.
#[derive(Debug, Clone)]
pub struct TypedRepository {
    store: Rc<KeyValueStore>,
}

impl TypedRepository {
    /// Create a repository over `store`.
    pub fn new(store: Rc<KeyValueStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &KeyValueStore {
        &self.store
    }

    fn read_collection<T: Record>(&self, key: StorageKey) -> Vec<T> {
        match self.store.get::<Value>(key.as_str()) {
            Some(value) => decode_collection(key.as_str(), value),
            None => Vec::new(),
        }
    }

    fn read_singleton<T: Record>(&self, key: StorageKey) -> Option<T> {
        let value = self.store.get::<Value>(key.as_str())?;
        if value.is_null() {
            return None;
        }
        decode_record(key.as_str(), value)
    }

    /// All valid tasks.
    pub fn get_tasks(&self) -> Vec<Task> {
        self.read_collection(StorageKey::Tasks)
    }

    /// Replace the task list.
    pub fn set_tasks(&self, tasks: &[Task]) -> bool {
        self.store.set(StorageKey::Tasks.as_str(), tasks)
    }

    /// All valid habits.
    pub fn get_habits(&self) -> Vec<Habit> {
        self.read_collection(StorageKey::Habits)
    }

    /// Replace the habit list.
    pub fn set_habits(&self, habits: &[Habit]) -> bool {
        self.store.set(StorageKey::Habits.as_str(), habits)
    }

    /// The user profile, if one is stored and valid.
    pub fn get_user(&self) -> Option<User> {
        self.read_singleton(StorageKey::User)
    }

    /// Replace the user profile.
    pub fn set_user(&self, user: &User) -> bool {
        self.store.set(StorageKey::User.as_str(), user)
    }

    /// Stored settings, if present and valid.
    pub fn get_settings(&self) -> Option<Settings> {
        self.read_singleton(StorageKey::Settings)
    }

    /// Stored settings, or the defaults.
    pub fn settings_or_default(&self) -> Settings {
        self.get_settings().unwrap_or_default()
    }

    /// Replace the settings.
    pub fn set_settings(&self, settings: &Settings) -> bool {
        self.store.set(StorageKey::Settings.as_str(), settings)
    }

    /// All valid achievements.
    pub fn get_achievements(&self) -> Vec<Achievement> {
        self.read_collection(StorageKey::Achievements)
    }

    /// Replace the achievement list.
    pub fn set_achievements(&self, achievements: &[Achievement]) -> bool {
        self.store
            .set(StorageKey::Achievements.as_str(), achievements)
    }

    /// The custom category list, passed through untouched.
    pub fn get_custom_categories(&self) -> Option<Value> {
        self.store.get(StorageKey::CustomCategories.as_str())
    }

    /// Replace the custom category list.
    pub fn set_custom_categories(&self, categories: &Value) -> bool {
        self.store
            .set(StorageKey::CustomCategories.as_str(), categories)
    }

    /// Remove every entity key. Returns `false` if any removal failed.
    pub fn clear_all(&self) -> bool {
        StorageKey::ENTITIES
            .iter()
            .fold(true, |ok, key| self.store.remove(key.as_str()) && ok)
    }

    /// Usage of every known key against `quota_bytes`.
    pub fn storage_usage(&self, quota_bytes: u64) -> StorageUsage {
        self.store.usage(&StorageKey::ALL, quota_bytes)
    }
}
