use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of a task's action journal
///
/// `detail` holds the owning user for cleanup entries and the release year
/// for acquisition entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    pub title: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl JournalEntry {
    pub fn new(title: impl Into<String>, detail: impl Into<String>, image: Option<String>) -> Self {
        Self {
            title: title.into(),
            detail: detail.into(),
            image,
            timestamp: Utc::now(),
        }
    }
}
