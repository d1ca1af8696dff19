use async_trait::async_trait;
use chrono::{DateTime, Utc};
use curator_config::{CleanupConfig, Config};
use curator_models::{JournalEntry, RunSummary};
use curator_sources::{Collaborators, HistoryStore, KeyValueStore, Notifier};
use std::sync::Arc;
use tracing::{error, info};
use crate::cascade::CascadeResolver;
use crate::error::TaskError;
use crate::filter::{has_filter_inputs, select_eligible};
use crate::journal::Journal;
use super::{send_summary, Task, CLEANUP_JOURNAL_KEY, CLEANUP_TASK};

/// Deletes history records (and their files) of allow-listed users once they
/// pass the age threshold
pub struct CleanupTask {
    config: CleanupConfig,
    history: Arc<dyn HistoryStore>,
    resolver: CascadeResolver,
    notifier: Arc<dyn Notifier>,
    state: Arc<dyn KeyValueStore>,
    journal: Journal,
}

impl CleanupTask {
    pub fn new(config: &Config, collaborators: &Collaborators) -> Self {
        let cleanup = config.cleanup.clone();
        let journal = Journal::new(collaborators.state.clone(), CLEANUP_JOURNAL_KEY, cleanup.journal_limit);
        Self {
            config: cleanup,
            history: collaborators.history.clone(),
            resolver: CascadeResolver::new(collaborators.history.clone(), collaborators.storage.clone()),
            notifier: collaborators.notifier.clone(),
            state: collaborators.state.clone(),
            journal,
        }
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Run against an explicit "now"
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunSummary, TaskError> {
        let allow_list = self.config.allow_list_entries();
        let global = self.config.threshold_days;
        if !has_filter_inputs(&allow_list, global) {
            info!(
                operation = "cleanup_run",
                task = CLEANUP_TASK,
                allow_list = allow_list.len(),
                "Allow-list or age threshold not configured, nothing to do"
            );
            return Err(TaskError::ConfigIncomplete(
                "cleanup needs a non-empty allow_list and a global or per-user threshold".to_string(),
            ));
        }

        let records = self.history.list_history().await.map_err(|e| {
            error!(operation = "cleanup_run", task = CLEANUP_TASK, error = %e, "Failed to list history");
            TaskError::Fetch(e)
        })?;

        let filtered = select_eligible(&records, &allow_list, global, now);
        let preview = !self.config.confirm_delete;
        let mut summary = RunSummary::new(CLEANUP_TASK);
        summary.found = filtered.eligible.len();
        summary.skipped = filtered.unparseable;
        summary.preview = preview;
        info!(
            operation = "cleanup_run",
            task = CLEANUP_TASK,
            total = records.len(),
            eligible = summary.found,
            preview = preview,
            "Filtered history"
        );

        for record in &filtered.eligible {
            match self.resolver.execute(record, preview).await {
                Ok(outcome) => {
                    summary.processed += 1;
                    summary.file_failures += outcome.file_failures;
                    if outcome.record_deleted {
                        let entry = JournalEntry::new(record.name.clone(), record.owner(), record.image.clone());
                        if let Err(e) = self.journal.append(entry).await {
                            error!(
                                operation = "cleanup_run",
                                record_id = record.id,
                                error = %e,
                                "Record deleted but journal update failed"
                            );
                        }
                    }
                }
                Err(e) => {
                    error!(
                        operation = "cleanup_run",
                        record_id = record.id,
                        name = %record.name,
                        error = %e,
                        "Failed to clean up record, skipping"
                    );
                    summary.skipped += 1;
                }
            }
        }

        info!(operation = "cleanup_run", task = CLEANUP_TASK, "{}", summary.summary_line());
        if self.config.common.notify {
            send_summary(self.notifier.as_ref(), &summary).await;
        }
        Ok(summary)
    }
}

#[async_trait]
impl Task for CleanupTask {
    fn name(&self) -> &'static str {
        CLEANUP_TASK
    }

    fn configure(&mut self, config: &Config) {
        self.config = config.cleanup.clone();
        self.journal = Journal::new(self.state.clone(), CLEANUP_JOURNAL_KEY, self.config.journal_limit);
    }

    fn is_enabled(&self) -> bool {
        self.config.common.enabled
    }

    async fn run(&self) -> Result<RunSummary, TaskError> {
        self.run_at(Utc::now()).await
    }

    fn describe_schedule(&self) -> (String, bool) {
        self.config.effective_cron()
    }
}
