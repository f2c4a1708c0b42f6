//! Persisted entity types.
//!
//! Field names serialize in camelCase to stay compatible with data written
//! by earlier clients. Timestamps are RFC 3339 strings on disk and
//! [`chrono::DateTime<Utc>`] in memory.
//!
//! Decoding a record is its shape check: required fields must be present
//! with the right primitive or enum type. [`Record::is_well_formed`] adds
//! the few single-field invariants serde cannot express. Cross-field
//! business rules are never checked here.

mod achievement;
mod habit;
mod settings;
mod task;
mod user;

pub use achievement::Achievement;
pub use habit::{Frequency, Habit};
pub use settings::{Settings, Theme};
pub use task::{Attribute, Priority, Task};
pub use user::{Attributes, User};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// An entity persisted as JSON.
pub trait Record: Serialize + DeserializeOwned {
    /// Human-readable entity name used in logs.
    const KIND: &'static str;

    /// Single-field invariants beyond what decoding enforces.
    fn is_well_formed(&self) -> bool {
        true
    }
}
