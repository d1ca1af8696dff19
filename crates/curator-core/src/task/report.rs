use async_trait::async_trait;
use curator_config::{Config, ReportConfig};
use curator_models::{HistoryRecord, RunSummary};
use curator_sources::{Collaborators, HistoryStore, Notifier};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};
use crate::error::TaskError;
use super::{Task, REPORT_TASK};

/// Read-only listing of completed history, grouped by owning user
pub struct ReportTask {
    config: ReportConfig,
    history: Arc<dyn HistoryStore>,
    notifier: Arc<dyn Notifier>,
}

impl ReportTask {
    pub fn new(config: &Config, collaborators: &Collaborators) -> Self {
        Self {
            config: config.report.clone(),
            history: collaborators.history.clone(),
            notifier: collaborators.notifier.clone(),
        }
    }

    /// History records per owner, each list most recent first
    pub async fn collect(&self) -> Result<BTreeMap<String, Vec<HistoryRecord>>, TaskError> {
        let records = self.history.list_history().await.map_err(|e| {
            error!(operation = "report_run", task = REPORT_TASK, error = %e, "Failed to list history");
            TaskError::Fetch(e)
        })?;

        let mut grouped: BTreeMap<String, Vec<HistoryRecord>> = BTreeMap::new();
        for record in records {
            grouped.entry(record.owner().to_string()).or_default().push(record);
        }
        Ok(grouped)
    }
}

#[async_trait]
impl Task for ReportTask {
    fn name(&self) -> &'static str {
        REPORT_TASK
    }

    fn configure(&mut self, config: &Config) {
        self.config = config.report.clone();
    }

    fn is_enabled(&self) -> bool {
        self.config.common.enabled
    }

    async fn run(&self) -> Result<RunSummary, TaskError> {
        let grouped = self.collect().await?;
        let mut summary = RunSummary::new(REPORT_TASK);
        let mut body = Vec::new();

        for (user, records) in &grouped {
            info!(operation = "report_run", user = %user, count = records.len(), "Completed downloads");
            for record in records {
                info!(
                    operation = "report_run",
                    user = %user,
                    name = %record.name,
                    completed_at = %record.completed_at,
                    "  {}",
                    record.identity
                );
            }
            summary.found += records.len();
            body.push(format!("{}: {}", user, records.len()));
        }
        summary.processed = summary.found;

        info!(operation = "report_run", task = REPORT_TASK, "{}", summary.summary_line());
        if self.config.common.notify {
            let title = format!("[{}] run finished", REPORT_TASK);
            let mut text = summary.summary_line();
            for line in &body {
                text.push('\n');
                text.push_str(line);
            }
            self.notifier.notify(&title, &text).await;
        }
        Ok(summary)
    }

    fn describe_schedule(&self) -> (String, bool) {
        self.config.effective_cron()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{collaborators, FakeHost, FakeStorage, MemoryStore, RecordingNotifier};
    use curator_models::MediaIdentity;

    fn record(id: i64, user: Option<&str>) -> HistoryRecord {
        HistoryRecord {
            id,
            identity: MediaIdentity::tv(100, Some(1)),
            name: format!("Show {}", id),
            username: user.map(str::to_string),
            completed_at: "2024-01-01 00:00:00".to_string(),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_groups_by_owner_and_notifies() {
        let host = Arc::new(FakeHost::with_history(vec![
            record(1, Some("bob")),
            record(2, Some("alice")),
            record(3, None),
            record(4, Some("bob")),
        ]));
        let notifier = Arc::new(RecordingNotifier::default());
        let collaborators = collaborators(
            host.clone(),
            Arc::new(FakeStorage::default()),
            Arc::new(MemoryStore::default()),
            notifier.clone(),
        );
        let mut config = Config::default();
        config.report.common.notify = true;
        let task = ReportTask::new(&config, &collaborators);

        let grouped = task.collect().await.unwrap();
        assert_eq!(grouped.keys().cloned().collect::<Vec<_>>(), vec!["alice", "bob", "unknown"]);
        assert_eq!(grouped["bob"].len(), 2);

        let summary = task.run().await.unwrap();
        assert_eq!(summary.found, 4);
        assert!(host.deleted_ids().is_empty());

        let messages = notifier.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].1.contains("bob: 2"));
    }
}
