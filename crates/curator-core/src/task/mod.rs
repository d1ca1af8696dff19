//! Schedulable tasks built on the reconciliation pieces

mod acquisition;
mod cleanup;
mod report;

pub use acquisition::{build_prompt, AcquisitionTask};
pub use cleanup::CleanupTask;
pub use report::ReportTask;

use async_trait::async_trait;
use curator_config::Config;
use curator_models::RunSummary;
use curator_sources::{Collaborators, Notifier};
use tracing::debug;
use crate::error::TaskError;

pub const CLEANUP_TASK: &str = "cleanup";
pub const ACQUISITION_TASK: &str = "acquisition";
pub const REPORT_TASK: &str = "report";

pub const CLEANUP_JOURNAL_KEY: &str = "cleanup_journal";
pub const ACQUISITION_JOURNAL_KEY: &str = "acquisition_journal";

pub const TASK_NAMES: [&str; 3] = [CLEANUP_TASK, ACQUISITION_TASK, REPORT_TASK];

/// A unit of scheduled work, independent of whatever host triggers it
///
/// `configure` swaps in a fresh configuration snapshot; `run` reads only that
/// snapshot, so there is no state carried between runs besides the journal.
#[async_trait]
pub trait Task: Send + Sync {
    fn name(&self) -> &'static str;

    fn configure(&mut self, config: &Config);

    fn is_enabled(&self) -> bool;

    /// One complete run. `Ok` means the run reached its summary, even if
    /// individual items were skipped.
    async fn run(&self) -> Result<RunSummary, TaskError>;

    /// Effective seconds-first cron expression and whether it is the built-in default
    fn describe_schedule(&self) -> (String, bool);
}

/// Build the named task from configuration and collaborators
pub fn task_by_name(name: &str, config: &Config, collaborators: &Collaborators) -> Option<Box<dyn Task>> {
    let task: Box<dyn Task> = match name {
        CLEANUP_TASK => Box::new(CleanupTask::new(config, collaborators)),
        ACQUISITION_TASK => Box::new(AcquisitionTask::new(config, collaborators)),
        REPORT_TASK => Box::new(ReportTask::new(config, collaborators)),
        _ => return None,
    };
    debug!(operation = "task_build", task = name, "Task constructed");
    Some(task)
}

pub(crate) async fn send_summary(notifier: &dyn Notifier, summary: &RunSummary) {
    let title = format!("[{}] run finished", summary.task);
    notifier.notify(&title, &summary.summary_line()).await;
}
