use serde::{Deserialize, Serialize};
use crate::media::MediaKind;

/// Placeholder id for candidates whose text carried no catalog id
pub const UNKNOWN_ID: &str = "unknown";

/// A title proposed by the recommender, as extracted from its text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub year: String,
    pub external_id: String,
}

impl Candidate {
    pub fn new(title: impl Into<String>, year: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: year.into(),
            external_id: external_id.into(),
        }
    }

    /// Declared TMDB id, if the recommender gave a numeric one
    pub fn declared_tmdb_id(&self) -> Option<u32> {
        if self.external_id == UNKNOWN_ID {
            return None;
        }
        self.external_id.trim().parse().ok()
    }
}

/// Canonical identity returned by the recognition collaborator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecognizedMedia {
    pub tmdb_id: u32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    pub kind: MediaKind,
    pub tmdb_id: u32,
    pub owner_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_path: Option<String>,
    #[serde(default)]
    pub sites: Vec<u32>,
}

/// Host answer to a subscription request; `id` is None when nothing was created
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionOutcome {
    pub id: Option<i64>,
    pub message: String,
}
