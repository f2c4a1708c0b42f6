//! Full-state snapshots: backup, restore, export, and import.
//!
//! A [`Snapshot`] is read from each entity store independently; there is no
//! cross-store locking, so it is only as consistent as the single-writer
//! model makes it.
//!
//! # Restore is not atomic
//!
//! [`BackupManager::restore`] writes the stores one after another. If a
//! write fails, the remaining writes are skipped and `false` is returned,
//! but the writes that already succeeded stay in place. Callers that need
//! to recover can restore an earlier snapshot.

use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Habit, Record, Settings, Task, User};
use crate::repository::{decode_collection, decode_record, TypedRepository};
use crate::storage::{KeyValueStore, StorageKey};

/// Compatibility string stamped into every snapshot.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Context label used when logging records dropped during import.
const IMPORT_CONTEXT: &str = "import";

/// Point-in-time copy of all entity stores.
///
/// A field that is `None` is left alone by [`BackupManager::restore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub tasks: Option<Vec<Task>>,
    pub habits: Option<Vec<Habit>>,
    pub user: Option<User>,
    pub settings: Option<Settings>,
    pub custom_categories: Option<Value>,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl Snapshot {
    /// An empty snapshot that restores nothing.
    pub fn empty() -> Self {
        Self {
            tasks: None,
            habits: None,
            user: None,
            settings: None,
            custom_categories: None,
            timestamp: Utc::now(),
            version: SNAPSHOT_VERSION.to_string(),
        }
    }

    /// Decode a snapshot leniently from parsed JSON.
    ///
    /// Returns `None` unless `value` is an object. A collection field that
    /// is not a list is treated as absent. Invalid records inside the
    /// collections are dropped, invalid singletons become `None`, and a
    /// missing timestamp or version is filled in.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut fields) = value else {
            return None;
        };

        let mut take = |name: &str| fields.remove(name).filter(|v| !v.is_null());

        let tasks = take("tasks").and_then(collection::<Task>);
        let habits = take("habits").and_then(collection::<Habit>);
        let user = take("user").and_then(|v| decode_record::<User>(IMPORT_CONTEXT, v));
        let settings = take("settings").and_then(|v| decode_record::<Settings>(IMPORT_CONTEXT, v));
        let custom_categories = take("customCategories");
        let timestamp = take("timestamp")
            .and_then(|v| serde_json::from_value::<DateTime<Utc>>(v).ok())
            .unwrap_or_else(Utc::now);
        let version = match take("version") {
            Some(Value::String(version)) => version,
            _ => {
                tracing::warn!("Snapshot has no version, assuming {}", SNAPSHOT_VERSION);
                SNAPSHOT_VERSION.to_string()
            }
        };

        if version != SNAPSHOT_VERSION {
            tracing::warn!(
                "Snapshot version {} differs from {}, importing anyway",
                version,
                SNAPSHOT_VERSION
            );
        }

        Some(Self {
            tasks,
            habits,
            user,
            settings,
            custom_categories,
            timestamp,
            version,
        })
    }
}

/// Decode an imported collection field. Anything but a list is ignored so
/// that restoring leaves the stored collection alone.
fn collection<T: Record>(value: Value) -> Option<Vec<T>> {
    if !value.is_array() {
        tracing::warn!("Ignoring imported {} field that is not a list", T::KIND);
        return None;
    }
    Some(decode_collection(IMPORT_CONTEXT, value))
}

/// Creates, stores, restores, and transports snapshots.
#[derive(Debug, Clone)]
pub struct BackupManager {
    repository: TypedRepository,
    store: Rc<KeyValueStore>,
}

impl BackupManager {
    /// Create a manager over `store`.
    pub fn new(store: Rc<KeyValueStore>) -> Self {
        Self {
            repository: TypedRepository::new(Rc::clone(&store)),
            store,
        }
    }

    /// Read every entity store into a snapshot stamped with the current time.
    pub fn create_snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: Some(self.repository.get_tasks()),
            habits: Some(self.repository.get_habits()),
            user: self.repository.get_user(),
            settings: self.repository.get_settings(),
            custom_categories: self.repository.get_custom_categories(),
            timestamp: Utc::now(),
            version: SNAPSHOT_VERSION.to_string(),
        }
    }

    /// Persist `snapshot` in the last-backup slot.
    pub fn save_named_backup(&self, snapshot: &Snapshot) -> bool {
        self.store.set(StorageKey::LastBackup.as_str(), snapshot)
    }

    /// Read the last-backup slot.
    pub fn load_named_backup(&self) -> Option<Snapshot> {
        let value = self.store.get::<Value>(StorageKey::LastBackup.as_str())?;
        Snapshot::from_value(value)
    }

    /// Snapshot the current state into the last-backup slot.
    pub fn backup_now(&self) -> Option<Snapshot> {
        let snapshot = self.create_snapshot();
        if self.save_named_backup(&snapshot) {
            tracing::info!("Saved backup taken at {}", snapshot.timestamp);
            Some(snapshot)
        } else {
            None
        }
    }

    /// Write each present snapshot field back to its store.
    ///
    /// Fields that are `None` leave the existing store untouched. The first
    /// failed write stops the restore and returns `false`; earlier writes
    /// are kept (see the module docs).
    pub fn restore(&self, snapshot: &Snapshot) -> bool {
        let repo = &self.repository;
        let mut written: Vec<&str> = Vec::new();

        if let Some(tasks) = &snapshot.tasks {
            if !repo.set_tasks(tasks) {
                return Self::abort_restore("tasks", &written);
            }
            written.push("tasks");
        }
        if let Some(habits) = &snapshot.habits {
            if !repo.set_habits(habits) {
                return Self::abort_restore("habits", &written);
            }
            written.push("habits");
        }
        if let Some(user) = &snapshot.user {
            if !repo.set_user(user) {
                return Self::abort_restore("user", &written);
            }
            written.push("user");
        }
        if let Some(settings) = &snapshot.settings {
            if !repo.set_settings(settings) {
                return Self::abort_restore("settings", &written);
            }
            written.push("settings");
        }
        if let Some(categories) = &snapshot.custom_categories {
            if !repo.set_custom_categories(categories) {
                return Self::abort_restore("customCategories", &written);
            }
            written.push("customCategories");
        }

        tracing::info!("Restored {:?} from snapshot {}", written, snapshot.timestamp);
        true
    }

    fn abort_restore(failed: &str, written: &[&str]) -> bool {
        tracing::error!(
            "Restore stopped at '{}'; already restored and kept: {:?}",
            failed,
            written
        );
        false
    }

    /// Restore from the last-backup slot. `false` if there is none.
    pub fn restore_last_backup(&self) -> bool {
        match self.load_named_backup() {
            Some(snapshot) => self.restore(&snapshot),
            None => {
                tracing::warn!("No backup to restore");
                false
            }
        }
    }

    /// Serialize `snapshot` as pretty-printed JSON.
    pub fn export_text(&self, snapshot: &Snapshot) -> String {
        // A snapshot is plain data with string keys; encoding cannot fail.
        serde_json::to_string_pretty(snapshot).unwrap_or_default()
    }

    /// Parse exported text and restore it.
    ///
    /// Unreadable text returns `false` without touching any store.
    pub fn import_text(&self, text: &str) -> bool {
        match Self::parse_text(text) {
            Some(snapshot) => self.restore(&snapshot),
            None => false,
        }
    }

    /// Parse exported text into a snapshot without restoring it.
    pub fn parse_text(text: &str) -> Option<Snapshot> {
        let value = match serde_json::from_str::<Value>(text) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Import rejected, not valid JSON: {}", e);
                return None;
            }
        };
        let snapshot = Snapshot::from_value(value);
        if snapshot.is_none() {
            tracing::warn!("Import rejected, payload is not a snapshot object");
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Frequency, Priority};
    use crate::storage::MemoryBackend;
    use serde_json::json;

    fn manager() -> BackupManager {
        BackupManager::new(Rc::new(KeyValueStore::in_memory()))
    }

    fn seed(repo: &TypedRepository) {
        repo.set_tasks(&[
            Task::new("t1", "Ship it").with_priority(Priority::High),
            Task::new("t2", "Rest"),
        ]);
        repo.set_habits(&[Habit::new("h1", "Journal", Frequency::Daily)]);
        repo.set_user(&User::new("u1", "Ari"));
        repo.set_settings(&Settings::default());
        repo.set_custom_categories(&json!([{"id": "c1", "name": "Garden"}]));
    }

    #[test]
    fn snapshot_reads_every_store() {
        let mgr = manager();
        seed(&mgr.repository);

        let snapshot = mgr.create_snapshot();
        assert_eq!(snapshot.tasks.as_ref().unwrap().len(), 2);
        assert_eq!(snapshot.habits.as_ref().unwrap().len(), 1);
        assert!(snapshot.user.is_some());
        assert!(snapshot.settings.is_some());
        assert!(snapshot.custom_categories.is_some());
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
    }

    #[test]
    fn snapshot_of_empty_store_has_empty_lists() {
        let snapshot = manager().create_snapshot();
        assert_eq!(snapshot.tasks, Some(Vec::new()));
        assert_eq!(snapshot.habits, Some(Vec::new()));
        assert!(snapshot.user.is_none());
    }

    #[test]
    fn restore_into_cleared_store_reproduces_entities() {
        let mgr = manager();
        seed(&mgr.repository);
        let snapshot = mgr.create_snapshot();

        assert!(mgr.repository.clear_all());
        assert!(mgr.restore(&snapshot));

        let again = mgr.create_snapshot();
        assert_eq!(again.tasks, snapshot.tasks);
        assert_eq!(again.habits, snapshot.habits);
        assert_eq!(again.user, snapshot.user);
        assert_eq!(again.settings, snapshot.settings);
        assert_eq!(again.custom_categories, snapshot.custom_categories);
    }

    #[test]
    fn restore_leaves_absent_fields_untouched() {
        let mgr = manager();
        seed(&mgr.repository);

        let mut partial = Snapshot::empty();
        partial.tasks = Some(vec![Task::new("t9", "Only task")]);
        assert!(mgr.restore(&partial));

        assert_eq!(mgr.repository.get_tasks().len(), 1);
        assert_eq!(mgr.repository.get_habits().len(), 1);
        assert!(mgr.repository.get_user().is_some());
    }

    #[test]
    fn failed_write_stops_restore_without_rollback() {
        let backend = Rc::new(MemoryBackend::new());
        let mgr = BackupManager::new(Rc::new(KeyValueStore::new(Rc::clone(&backend))));
        seed(&mgr.repository);
        let snapshot = mgr.create_snapshot();

        mgr.repository.clear_all();
        backend.deny_writes_to(StorageKey::User.as_str());

        assert!(!mgr.restore(&snapshot));
        assert_eq!(mgr.repository.get_tasks().len(), 2);
        assert_eq!(mgr.repository.get_habits().len(), 1);
        assert!(mgr.repository.get_user().is_none());
        assert!(mgr.repository.get_settings().is_none());
    }

    #[test]
    fn named_backup_round_trip() {
        let mgr = manager();
        seed(&mgr.repository);

        let saved = mgr.backup_now().unwrap();
        assert_eq!(mgr.load_named_backup(), Some(saved));
    }

    #[test]
    fn load_named_backup_when_missing() {
        assert!(manager().load_named_backup().is_none());
        assert!(!manager().restore_last_backup());
    }

    #[test]
    fn restore_last_backup_after_changes() {
        let mgr = manager();
        seed(&mgr.repository);
        mgr.backup_now().unwrap();

        mgr.repository.set_tasks(&[]);
        assert!(mgr.restore_last_backup());
        assert_eq!(mgr.repository.get_tasks().len(), 2);
    }

    #[test]
    fn export_then_parse_round_trips() {
        let mgr = manager();
        seed(&mgr.repository);
        let snapshot = mgr.create_snapshot();

        let text = mgr.export_text(&snapshot);
        assert_eq!(BackupManager::parse_text(&text), Some(snapshot));
    }

    #[test]
    fn export_uses_transport_field_names() {
        let mgr = manager();
        let text = mgr.export_text(&mgr.create_snapshot());
        let value: Value = serde_json::from_str(&text).unwrap();
        for field in [
            "tasks",
            "habits",
            "user",
            "settings",
            "customCategories",
            "timestamp",
            "version",
        ] {
            assert!(value.get(field).is_some(), "missing {}", field);
        }
    }

    #[test]
    fn import_garbage_changes_nothing() {
        let mgr = manager();
        seed(&mgr.repository);

        assert!(!mgr.import_text("not json at all"));
        assert!(!mgr.import_text("[1, 2, 3]"));
        assert_eq!(mgr.repository.get_tasks().len(), 2);
    }

    #[test]
    fn import_drops_invalid_records_only() {
        let mgr = manager();
        let text = json!({
            "tasks": [
                serde_json::to_value(Task::new("t1", "Keep")).unwrap(),
                {"id": "t2"}
            ],
            "version": "0.9"
        })
        .to_string();

        assert!(mgr.import_text(&text));
        let tasks = mgr.repository.get_tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "t1");
    }

    #[test]
    fn import_with_null_user_keeps_existing_user() {
        let mgr = manager();
        seed(&mgr.repository);

        let text = json!({"user": null, "tasks": []}).to_string();
        assert!(mgr.import_text(&text));
        assert!(mgr.repository.get_user().is_some());
        assert!(mgr.repository.get_tasks().is_empty());
    }

    #[test]
    fn import_with_non_list_collections_keeps_existing() {
        let mgr = manager();
        seed(&mgr.repository);

        let text = r#"{"tasks":"garbage","habits":{},"version":"1.0"}"#;
        let snapshot = BackupManager::parse_text(text).unwrap();
        assert!(snapshot.tasks.is_none());
        assert!(snapshot.habits.is_none());

        assert!(mgr.import_text(text));
        assert_eq!(mgr.repository.get_tasks().len(), 2);
        assert_eq!(mgr.repository.get_habits().len(), 1);
    }

    #[test]
    fn unavailable_storage_fails_quietly() {
        let mgr = BackupManager::new(Rc::new(KeyValueStore::new(MemoryBackend::unavailable())));
        assert!(mgr.backup_now().is_none());
        assert!(!mgr.restore_last_backup());

        let mut snapshot = Snapshot::empty();
        snapshot.tasks = Some(Vec::new());
        assert!(!mgr.restore(&snapshot));
    }
}
