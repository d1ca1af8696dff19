//! Extraction of `(title, year, id)` candidates from recommender text

use curator_models::{Candidate, UNKNOWN_ID};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Turns free-form recommender output into candidates
///
/// Kept behind a trait so a structured-output parser can replace the regex
/// one without touching the acquisition flow.
pub trait RecommendationParser: Send + Sync {
    fn parse(&self, text: &str) -> Vec<Candidate>;
}

// Optional bullet (`*`, `-`, `•`, `1.`), optional bold markers and title
// brackets, then `(YYYY)`. Full-width parentheses are accepted too.
static STRICT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:[*\-•][ \t]*|\d+[.)][ \t]*)?\**[ \t]*[《\[【]?[ \t]*(?P<title>[^《》\[\]【】*\n]+?)[ \t]*[》\]】]?\**[ \t]*[(（][ \t]*(?P<year>\d{4})[ \t]*[)）][ \t]*[(（][ \t]*TMDB[ \t]*ID[ \t]*[:：][ \t]*(?P<id>\d+)[ \t]*[)）]",
    )
    .expect("strict recommendation pattern is valid")
});

static FALLBACK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:[*\-•][ \t]*|\d+[.)][ \t]*)?\**[ \t]*[《\[【]?[ \t]*(?P<title>[^《》\[\]【】*\n]+?)[ \t]*[》\]】]?\**[ \t]*[(（][ \t]*(?P<year>\d{4})[ \t]*[)）]",
    )
    .expect("fallback recommendation pattern is valid")
});

/// Line-oriented regex parser for `《Title》(Year) (TMDB ID: n)` output
///
/// When no line carries an id, falls back to `title (year)` with the id set
/// to [`UNKNOWN_ID`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexRecommendationParser;

impl RegexRecommendationParser {
    pub fn new() -> Self {
        Self
    }

    fn extract(pattern: &Regex, text: &str, with_id: bool) -> Vec<Candidate> {
        pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let title = caps.name("title")?.as_str().trim();
                let year = caps.name("year")?.as_str();
                if title.is_empty() {
                    return None;
                }
                let id = if with_id {
                    caps.name("id")?.as_str().to_string()
                } else {
                    UNKNOWN_ID.to_string()
                };
                Some(Candidate::new(title, year, id))
            })
            .collect()
    }
}

impl RecommendationParser for RegexRecommendationParser {
    fn parse(&self, text: &str) -> Vec<Candidate> {
        let strict = Self::extract(&STRICT_PATTERN, text, true);
        if !strict.is_empty() {
            debug!(operation = "parse_recommendations", count = strict.len(), "Parsed candidates with ids");
            return strict;
        }

        let loose = Self::extract(&FALLBACK_PATTERN, text, false);
        if loose.is_empty() {
            warn!(operation = "parse_recommendations", "No 'Title (Year)' entries found in recommender output");
        } else {
            debug!(operation = "parse_recommendations", count = loose.len(), "Parsed candidates without ids");
        }
        loose
    }
}
