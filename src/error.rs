//! Error types for Questlog operations.
//!
//! This module defines [`QuestlogError`], the error type used by the
//! storage backends, configuration loading, and CLI commands, and a
//! [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Backends and loaders return `QuestlogError` and propagate with `?`
//! - The storage, repository, backup, and tutorial surfaces never let an
//!   error escape: they log it and return `false` or `None`
//! - Use `anyhow::Error` (via `QuestlogError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Questlog operations.
#[derive(Debug, Error)]
pub enum QuestlogError {
    /// The host storage failed its availability probe.
    #[error("Storage is unavailable")]
    StorageUnavailable,

    /// A write would push the store past its quota.
    #[error("Storage quota exceeded writing '{key}': need {needed} bytes, quota is {quota}")]
    QuotaExceeded {
        key: String,
        needed: u64,
        quota: u64,
    },

    /// Stored or imported text could not be decoded.
    #[error("Malformed payload under '{key}': {message}")]
    MalformedPayload { key: String, message: String },

    /// A tutorial step id that is not part of the template.
    #[error("Unknown tutorial step: {id}")]
    UnknownStep { id: String },

    /// Failed to parse the configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error wrapper.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Questlog operations.
pub type Result<T> = std::result::Result<T, QuestlogError>;
