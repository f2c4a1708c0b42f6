//! Storage backends.
//!
//! A [`StorageBackend`] is the raw text key-value medium. Two
//! implementations ship with the crate:
//!
//! - [`MemoryBackend`]: process-local map, used by tests and `--backend memory`
//! - [`FileBackend`]: one `<key>.json` file per key under a data directory
//!
//! Both enforce an optional byte quota so that a full store fails writes
//! the way a browser's storage does.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use crate::error::{QuestlogError, Result};

/// Raw text key-value storage.
pub trait StorageBackend {
    /// Read the text stored under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// List every key currently stored.
    fn keys(&self) -> Result<Vec<String>>;
}

impl<T: StorageBackend + ?Sized> StorageBackend for Rc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}

impl<T: StorageBackend + ?Sized> StorageBackend for Box<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}

/// Bytes a single entry counts against the quota.
pub(crate) fn entry_size(key: &str, value: &str) -> u64 {
    (key.len() + value.len()) as u64
}

/// Fail with `QuotaExceeded` if replacing `key` would exceed `quota`.
fn check_quota(key: &str, value: &str, used_by_others: u64, quota: Option<u64>) -> Result<()> {
    let Some(quota) = quota else {
        return Ok(());
    };
    let needed = used_by_others + entry_size(key, value);
    if needed > quota {
        return Err(QuestlogError::QuotaExceeded {
            key: key.to_string(),
            needed,
            quota,
        });
    }
    Ok(())
}

/// In-memory backend.
///
/// Share it through an `Rc` to keep a handle for inspection after handing
/// the store its own.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: RefCell<BTreeMap<String, String>>,
    quota: Option<u64>,
    unavailable: bool,
    denied: RefCell<HashSet<String>>,
}

impl MemoryBackend {
    /// Create an empty, unlimited backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that rejects writes beyond `quota` bytes.
    pub fn with_quota(quota: u64) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    /// Create a backend where every operation fails, like storage that is
    /// disabled by the host.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Make every future write to `key` fail.
    pub fn deny_writes_to(&self, key: &str) {
        self.denied.borrow_mut().insert(key.to_string());
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    fn ensure_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(QuestlogError::StorageUnavailable);
        }
        Ok(())
    }
}

impl StorageBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.ensure_available()?;
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_available()?;
        if self.denied.borrow().contains(key) {
            return Err(QuestlogError::Other(anyhow::anyhow!(
                "writes to '{}' are denied",
                key
            )));
        }

        let used_by_others: u64 = self
            .items
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| entry_size(k, v))
            .sum();
        check_quota(key, value, used_by_others, self.quota)?;

        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.ensure_available()?;
        self.items.borrow_mut().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.ensure_available()?;
        Ok(self.items.borrow().keys().cloned().collect())
    }
}

/// File-per-key backend rooted at a data directory.
///
/// Writes go to a temp file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
    quota: Option<u64>,
}

impl FileBackend {
    const EXTENSION: &'static str = "json";

    /// Create a backend storing files under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            quota: None,
        }
    }

    /// Limit the total stored bytes.
    pub fn with_quota(mut self, quota: u64) -> Self {
        self.quota = Some(quota);
        self
    }

    /// Whether `key` can be stored as a file name.
    fn is_valid_key(key: &str) -> bool {
        !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }

    /// Path of the file holding `key`.
    pub fn item_path(&self, key: &str) -> Result<PathBuf> {
        if !Self::is_valid_key(key) {
            return Err(QuestlogError::Other(anyhow::anyhow!(
                "invalid storage key '{}'",
                key
            )));
        }
        Ok(self.root.join(format!("{}.{}", key, Self::EXTENSION)))
    }

    fn used_by_others(&self, key: &str) -> Result<u64> {
        let mut used = 0;
        for other in self.keys()? {
            if other == key {
                continue;
            }
            let len = fs::metadata(self.item_path(&other)?)?.len();
            used += other.len() as u64 + len;
        }
        Ok(used)
    }
}

impl StorageBackend for FileBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.item_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.item_path(key)?;
        check_quota(key, value, self.used_by_others(key)?, self.quota)?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value)?;
        fs::rename(&temp_path, &path)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.item_path(key)?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == Self::EXTENSION) {
                // Other JSON files (exports, editor backups) are not ours.
                match path.file_stem().and_then(|s| s.to_str()) {
                    Some(stem) if Self::is_valid_key(stem) => keys.push(stem.to_string()),
                    _ => tracing::debug!("Ignoring foreign file {}", path.display()),
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}
