use serde::{Deserialize, Serialize};
use std::fmt;

/// Counters reported at the end of every completed run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    pub task: String,
    pub found: usize,
    pub processed: usize,
    pub skipped: usize,
    /// File deletions that failed without stopping the record they belong to
    #[serde(default)]
    pub file_failures: usize,
    #[serde(default)]
    pub preview: bool,
}

impl RunSummary {
    pub fn new(task: impl Into<String>) -> Self {
        Self { task: task.into(), ..Self::default() }
    }

    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "found {}, processed {}, skipped {}",
            self.found, self.processed, self.skipped
        );
        if self.file_failures > 0 {
            line.push_str(&format!(", {} file deletion(s) failed", self.file_failures));
        }
        if self.preview {
            line.push_str(" (preview, nothing deleted)");
        }
        line
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.task, self.summary_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line() {
        let mut summary = RunSummary::new("cleanup");
        summary.found = 3;
        summary.processed = 2;
        summary.skipped = 1;
        assert_eq!(summary.summary_line(), "found 3, processed 2, skipped 1");

        summary.file_failures = 1;
        summary.preview = true;
        assert_eq!(
            summary.to_string(),
            "[cleanup] found 3, processed 2, skipped 1, 1 file deletion(s) failed (preview, nothing deleted)"
        );
    }
}
