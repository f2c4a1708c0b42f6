//! Integration tests for the storage and repository public API.

use std::fs;
use std::rc::Rc;

use questlog::model::{Attribute, Frequency, Habit, Priority, Task, User};
use questlog::storage::{FileBackend, KeyValueStore, StorageKey};
use questlog::TypedRepository;
use tempfile::TempDir;

fn file_store(temp: &TempDir) -> Rc<KeyValueStore> {
    Rc::new(KeyValueStore::new(FileBackend::new(temp.path().join("data"))))
}

#[test]
fn records_survive_reopening_the_store() {
    let temp = TempDir::new().unwrap();
    let tasks = vec![
        Task::new("t1", "Write report")
            .with_priority(Priority::High)
            .with_difficulty(3)
            .with_categories(vec!["work"])
            .with_reward(Attribute::Intelligence, 5),
        Task::new("t2", "Sketch"),
    ];
    let habits = vec![Habit::new("h1", "Walk", Frequency::Weekly)];
    let user = User::new("u1", "Ada");

    {
        let repo = TypedRepository::new(file_store(&temp));
        assert!(repo.set_tasks(&tasks));
        assert!(repo.set_habits(&habits));
        assert!(repo.set_user(&user));
    }

    let repo = TypedRepository::new(file_store(&temp));
    assert_eq!(repo.get_tasks(), tasks);
    assert_eq!(repo.get_habits(), habits);
    assert_eq!(repo.get_user(), Some(user));
}

#[test]
fn one_corrupted_record_on_disk_keeps_its_siblings() {
    let temp = TempDir::new().unwrap();
    let repo = TypedRepository::new(file_store(&temp));
    repo.set_tasks(&[Task::new("t1", "A"), Task::new("t2", "B"), Task::new("t3", "C")]);

    let path = temp.path().join("data").join("questlog_tasks.json");
    let mut raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    raw[1]["priority"] = serde_json::json!("urgent");
    fs::write(&path, raw.to_string()).unwrap();

    let ids: Vec<String> = repo.get_tasks().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, ["t1", "t3"]);
}

#[test]
fn truncated_file_reads_as_no_data() {
    let temp = TempDir::new().unwrap();
    let repo = TypedRepository::new(file_store(&temp));
    repo.set_user(&User::new("u1", "Ada"));

    let path = temp.path().join("data").join("questlog_user.json");
    fs::write(&path, "{\"id\": \"u1\", \"na").unwrap();

    assert_eq!(repo.get_user(), None);
}

#[test]
fn quota_exceeded_write_reports_false_and_keeps_old_value() {
    let temp = TempDir::new().unwrap();
    let store = Rc::new(KeyValueStore::new(
        FileBackend::new(temp.path().join("data")).with_quota(200),
    ));
    assert!(store.set_raw(StorageKey::Tasks.as_str(), "[]"));

    let big = "x".repeat(500);
    assert!(!store.set(StorageKey::Tasks.as_str(), &big));
    assert_eq!(store.get_raw(StorageKey::Tasks.as_str()), Some("[]".to_string()));
}

#[test]
fn unusable_data_dir_makes_store_unavailable() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not-a-dir");
    fs::write(&blocker, "file").unwrap();

    let store = Rc::new(KeyValueStore::new(FileBackend::new(&blocker)));
    assert!(!store.is_available());

    let repo = TypedRepository::new(store);
    assert!(!repo.set_tasks(&[Task::new("t1", "A")]));
    assert!(repo.get_tasks().is_empty());
}

#[test]
fn usage_counts_key_and_value_bytes() {
    let store = Rc::new(KeyValueStore::in_memory());
    store.set_raw(StorageKey::Tasks.as_str(), "[]");
    store.set_raw(StorageKey::User.as_str(), "{}");

    let usage = store.usage(&StorageKey::ALL, 1000);
    assert_eq!(usage.used_bytes, (14 + 2) + (13 + 2));
    assert_eq!(usage.per_key.len(), 2);
    assert_eq!(usage.percentage, 3.1);
    assert_eq!(usage.remaining_bytes(), 969);
}

#[test]
fn exported_file_in_data_dir_keeps_store_available() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("my.export.json"), "{\"version\":\"1.0\"}").unwrap();

    let store = file_store(&temp);
    assert!(store.is_available());

    let repo = TypedRepository::new(store);
    assert!(repo.set_tasks(&[Task::new("t1", "A")]));
    assert_eq!(repo.get_tasks().len(), 1);
}
