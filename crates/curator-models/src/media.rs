use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::Tv => write!(f, "tv"),
        }
    }
}

/// Catalog identity of a piece of media as the host tracks it
///
/// `season` is only meaningful for TV; it is ignored when matching movies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MediaIdentity {
    pub kind: MediaKind,
    pub tmdb_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
}

impl MediaIdentity {
    pub fn movie(tmdb_id: u32) -> Self {
        Self { kind: MediaKind::Movie, tmdb_id, season: None }
    }

    pub fn tv(tmdb_id: u32, season: Option<u32>) -> Self {
        Self { kind: MediaKind::Tv, tmdb_id, season }
    }

    /// Season used for download lookups (always None for movies)
    pub fn lookup_season(&self) -> Option<u32> {
        match self.kind {
            MediaKind::Movie => None,
            MediaKind::Tv => self.season,
        }
    }

    /// Whether two identities refer to the same download unit
    pub fn matches(&self, other: &MediaIdentity) -> bool {
        self.kind == other.kind
            && self.tmdb_id == other.tmdb_id
            && self.lookup_season() == other.lookup_season()
    }
}

impl fmt::Display for MediaIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lookup_season() {
            Some(season) => write!(f, "{}:{} S{:02}", self.kind, self.tmdb_id, season),
            None => write!(f, "{}:{}", self.kind, self.tmdb_id),
        }
    }
}
