pub mod error;
pub mod filter;
pub mod cascade;
pub mod parser;
pub mod acquisition;
pub mod journal;
pub mod task;

#[cfg(test)]
pub(crate) mod testing;

pub use error::TaskError;
pub use filter::{has_filter_inputs, parse_completed_at, select_eligible, FilterOutcome};
pub use cascade::{CascadeOutcome, CascadeResolver};
pub use parser::{RecommendationParser, RegexRecommendationParser};
pub use acquisition::{AcquisitionDecider, Decision, RejectReason};
pub use journal::Journal;
pub use task::{
    build_prompt, task_by_name, AcquisitionTask, CleanupTask, ReportTask, Task, ACQUISITION_JOURNAL_KEY,
    ACQUISITION_TASK, CLEANUP_JOURNAL_KEY, CLEANUP_TASK, REPORT_TASK, TASK_NAMES,
};
