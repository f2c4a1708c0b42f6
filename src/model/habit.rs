//! Habit records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Record;

/// How often a habit is meant to be done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

/// A recurring habit with streak counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub streak: u32,
    pub best_streak: u32,
    pub target_frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// Create a habit with no streak yet.
    pub fn new(id: impl Into<String>, name: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            streak: 0,
            best_streak: 0,
            target_frequency: frequency,
            last_completed: None,
            created_at: Utc::now(),
        }
    }
}

impl Record for Habit {
    const KIND: &'static str = "habit";

    fn is_well_formed(&self) -> bool {
        !self.id.is_empty()
    }
}
