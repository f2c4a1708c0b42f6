//! JSON key-value store over a [`StorageBackend`].

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::backend::{MemoryBackend, StorageBackend};

/// Key written and deleted once at construction to detect availability.
const PROBE_KEY: &str = "__storage_test__";

/// JSON-encoding wrapper around the host storage.
///
/// Availability is probed once in [`KeyValueStore::new`]. An unavailable
/// store never touches the backend again: reads return `None` and writes
/// return `false`. No operation panics or returns an error; failures are
/// logged and reported through the return value only, with no retries.
pub struct KeyValueStore {
    backend: Box<dyn StorageBackend>,
    available: bool,
}

impl KeyValueStore {
    /// Wrap `backend`, probing it with a write and delete.
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        let available = match backend
            .set_item(PROBE_KEY, PROBE_KEY)
            .and_then(|_| backend.remove_item(PROBE_KEY))
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Storage unavailable, persistence disabled: {}", e);
                false
            }
        };

        Self {
            backend: Box::new(backend),
            available,
        }
    }

    /// A store over a fresh [`MemoryBackend`].
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Whether the availability probe succeeded.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Read the raw text under `key`.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        if !self.available {
            return None;
        }
        match self.backend.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to read '{}': {}", key, e);
                None
            }
        }
    }

    /// Read and decode the value under `key`.
    ///
    /// Returns `None` when the store is unavailable, the key is absent, or
    /// the stored text does not decode as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let text = self.get_raw(key)?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Discarding unreadable value under '{}': {}", key, e);
                None
            }
        }
    }

    /// Write raw text under `key`.
    pub fn set_raw(&self, key: &str, text: &str) -> bool {
        if !self.available {
            return false;
        }
        match self.backend.set_item(key, text) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to write '{}': {}", key, e);
                false
            }
        }
    }

    /// Encode `value` as JSON and write it under `key`.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        if !self.available {
            return false;
        }
        match serde_json::to_string(value) {
            Ok(text) => self.set_raw(key, &text),
            Err(e) => {
                tracing::error!("Failed to encode value for '{}': {}", key, e);
                false
            }
        }
    }

    /// Delete `key`.
    pub fn remove(&self, key: &str) -> bool {
        if !self.available {
            return false;
        }
        match self.backend.remove_item(key) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to remove '{}': {}", key, e);
                false
            }
        }
    }
}

impl std::fmt::Debug for KeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValueStore")
            .field("available", &self.available)
            .finish_non_exhaustive()
    }
}
