//! The user profile singleton.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Record;

/// Attribute counters raised by completing tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attributes {
    pub strength: u32,
    pub intelligence: u32,
    pub creativity: u32,
}

/// The single local user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub experience: u64,
    pub attributes: Attributes,
    /// Ids of unlocked achievements.
    #[serde(default)]
    pub achievements: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a level 1 user with no experience.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            level: 1,
            experience: 0,
            attributes: Attributes::default(),
            achievements: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Record for User {
    const KIND: &'static str = "user";

    fn is_well_formed(&self) -> bool {
        !self.id.is_empty() && self.level >= 1
    }
}
