use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::media::MediaIdentity;

/// A completed acquisition as recorded by the host
///
/// `completed_at` is kept as the host's text; parsing happens at filter time
/// so that one malformed row cannot poison a whole listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRecord {
    pub id: i64,
    pub identity: MediaIdentity,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub completed_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl HistoryRecord {
    pub fn owner(&self) -> &str {
        self.username.as_deref().unwrap_or("unknown")
    }

    pub fn completed_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_completed_at(&self.completed_at)
    }
}

/// Parse a host completion timestamp; naive values are taken as UTC
pub fn parse_completed_at(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
