use curator_sources::SourceError;
use thiserror::Error;

/// Run-level failures
///
/// Per-item failures never reach this type; they are counted as skips.
#[derive(Error, Debug)]
pub enum TaskError {
    /// Required inputs are missing; the run stopped before touching anything
    #[error("configuration incomplete: {0}")]
    ConfigIncomplete(String),

    #[error("failed to fetch candidates: {0}")]
    Fetch(#[source] SourceError),

    #[error("recommender returned no result")]
    Recommender,

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("journal error: {0}")]
    Journal(String),
}

impl TaskError {
    /// Incomplete configuration is a safety stop, not a failure
    pub fn is_config_incomplete(&self) -> bool {
        matches!(self, TaskError::ConfigIncomplete(_))
    }
}
