//! Achievement records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Record;

/// An achievement and whether it has been unlocked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Achievement {
    /// Whether the achievement has been unlocked.
    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }
}

impl Record for Achievement {
    const KIND: &'static str = "achievement";

    fn is_well_formed(&self) -> bool {
        !self.id.is_empty()
    }
}
