use curator_models::{FileRef, HistoryRecord};
use curator_sources::{FileStorage, HistoryStore, SourceError};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of resolving (and, outside preview, deleting) one history record
#[derive(Debug, Clone, Default)]
pub struct CascadeOutcome {
    /// Every file the record's transfers reference, destination before source
    pub files: Vec<FileRef>,
    pub files_deleted: usize,
    pub file_failures: usize,
    pub record_deleted: bool,
}

/// Walks history record -> downloads -> transfers -> files
pub struct CascadeResolver {
    history: Arc<dyn HistoryStore>,
    storage: Arc<dyn FileStorage>,
}

impl CascadeResolver {
    pub fn new(history: Arc<dyn HistoryStore>, storage: Arc<dyn FileStorage>) -> Self {
        Self { history, storage }
    }

    /// Files that deleting `record` would remove
    pub async fn resolve_files(&self, record: &HistoryRecord) -> Result<Vec<FileRef>, SourceError> {
        let mut files = Vec::new();
        for download in self.history.downloads_for(&record.identity).await? {
            for transfer in self.history.transfers_for(&download.hash).await? {
                files.extend(transfer.dest);
                files.extend(transfer.src);
            }
        }
        Ok(files)
    }

    /// Delete every referenced file, then the record itself
    ///
    /// Each file is attempted independently; failures are counted, not
    /// returned. Only lookups and the final record deletion can fail the
    /// call. In preview mode nothing is deleted and the outcome only lists
    /// the files.
    pub async fn execute(&self, record: &HistoryRecord, preview: bool) -> Result<CascadeOutcome, SourceError> {
        let files = self.resolve_files(record).await?;
        let mut outcome = CascadeOutcome::default();

        if preview {
            info!(
                operation = "cascade_preview",
                record_id = record.id,
                name = %record.name,
                files = files.len(),
                "Would delete record and its files"
            );
            for file in &files {
                debug!(operation = "cascade_preview", record_id = record.id, file = %file, "Would delete file");
            }
            outcome.files = files;
            return Ok(outcome);
        }

        for file in &files {
            match self.storage.delete_file(file).await {
                Ok(true) => outcome.files_deleted += 1,
                Ok(false) => {
                    warn!(operation = "delete_file", record_id = record.id, file = %file, "Storage refused deletion");
                    outcome.file_failures += 1;
                }
                Err(e) => {
                    warn!(
                        operation = "delete_file",
                        record_id = record.id,
                        file = %file,
                        error = %e,
                        "Failed to delete file"
                    );
                    outcome.file_failures += 1;
                }
            }
        }

        self.history.delete_history(record.id).await?;
        outcome.record_deleted = true;
        outcome.files = files;
        info!(
            operation = "cascade_delete",
            record_id = record.id,
            name = %record.name,
            files_deleted = outcome.files_deleted,
            file_failures = outcome.file_failures,
            "Deleted history record"
        );
        Ok(outcome)
    }
}
