//! Application configuration.
//!
//! Settings are resolved in priority order (later overrides earlier):
//! 1. Built-in defaults
//! 2. The YAML config file (`<data_dir>/config.yml`, or `--config`)
//! 3. `--data-dir` / `QUESTLOG_DATA_DIR`
//!
//! # Example config
//!
//! ```yaml
//! data_dir: /home/me/.questlog
//! quota_bytes: 10485760
//! backend: file
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{QuestlogError, Result};
use crate::storage::{FileBackend, KeyValueStore, MemoryBackend, DEFAULT_QUOTA_BYTES};

/// Which storage backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// One JSON file per key under `data_dir`.
    #[default]
    File,
    /// Process-local memory; nothing survives exit.
    Memory,
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the stored keys.
    pub data_dir: PathBuf,
    /// Storage quota in bytes; writes beyond it fail.
    pub quota_bytes: u64,
    /// Storage backend.
    pub backend: BackendKind,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(Self::DEFAULT_DATA_DIR),
            quota_bytes: DEFAULT_QUOTA_BYTES,
            backend: BackendKind::default(),
        }
    }
}

impl AppConfig {
    /// Data directory used when none is configured.
    pub const DEFAULT_DATA_DIR: &'static str = ".questlog";

    /// Config file name inside the data directory.
    pub const FILE_NAME: &'static str = "config.yml";

    /// Load a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| QuestlogError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Resolve the config from optional CLI overrides.
    pub fn resolve(data_dir: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Self> {
        let base_dir = data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_DATA_DIR));
        let path = config_path.unwrap_or_else(|| base_dir.join(Self::FILE_NAME));

        let mut config = Self::load(&path)?;
        if let Some(dir) = data_dir {
            config.data_dir = dir;
        }

        tracing::debug!("Resolved config: {:?}", config);
        Ok(config)
    }

    /// Open the configured store.
    pub fn open_store(&self) -> KeyValueStore {
        match self.backend {
            BackendKind::File => KeyValueStore::new(
                FileBackend::new(&self.data_dir).with_quota(self.quota_bytes),
            ),
            BackendKind::Memory => KeyValueStore::new(MemoryBackend::with_quota(self.quota_bytes)),
        }
    }
}
