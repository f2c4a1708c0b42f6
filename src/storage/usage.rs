//! Storage usage statistics.

use serde::Serialize;

use super::backend::entry_size;
use super::{KeyValueStore, StorageKey};

/// Quota assumed when none is configured (5 MiB, the common browser limit).
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// Bytes used by a single key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyUsage {
    pub key: String,
    pub bytes: u64,
}

/// Byte usage across the known keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageUsage {
    /// Total bytes (key plus value length) across present keys.
    pub used_bytes: u64,
    /// The quota the percentage is computed against.
    pub quota_bytes: u64,
    /// `used / quota` as a percentage, two decimals, capped at 100.
    pub percentage: f64,
    /// Per-key breakdown, only keys that are present.
    pub per_key: Vec<KeyUsage>,
}

impl StorageUsage {
    /// Bytes still available under the quota.
    pub fn remaining_bytes(&self) -> u64 {
        self.quota_bytes.saturating_sub(self.used_bytes)
    }
}

impl KeyValueStore {
    /// Measure how much of `quota_bytes` the given keys occupy.
    pub fn usage(&self, keys: &[StorageKey], quota_bytes: u64) -> StorageUsage {
        let per_key: Vec<KeyUsage> = keys
            .iter()
            .filter_map(|key| {
                let value = self.get_raw(key.as_str())?;
                Some(KeyUsage {
                    key: key.as_str().to_string(),
                    bytes: entry_size(key.as_str(), &value),
                })
            })
            .collect();

        let used_bytes = per_key.iter().map(|k| k.bytes).sum();
        let percentage = if quota_bytes == 0 {
            100.0
        } else {
            let raw = used_bytes as f64 / quota_bytes as f64 * 100.0;
            ((raw * 100.0).round() / 100.0).min(100.0)
        };

        StorageUsage {
            used_bytes,
            quota_bytes,
            percentage,
            per_key,
        }
    }
}
