use serde::{Deserialize, Serialize};

/// An identity allowed through the cleanup filter, with an optional
/// per-identity age threshold in days
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllowListEntry {
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_days: Option<u32>,
}

impl AllowListEntry {
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into(), threshold_days: None }
    }

    pub fn with_threshold(user: impl Into<String>, days: u32) -> Self {
        Self { user: user.into(), threshold_days: Some(days) }
    }

    /// Override if present, otherwise the global threshold
    pub fn effective_threshold(&self, global: Option<u32>) -> Option<u32> {
        self.threshold_days.or(global)
    }
}
