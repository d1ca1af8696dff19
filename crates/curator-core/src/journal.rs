use curator_models::JournalEntry;
use curator_sources::KeyValueStore;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use crate::error::TaskError;

/// Bounded, append-ordered action log persisted under one key
///
/// Appends are read-modify-write cycles serialized by an internal lock and
/// written back as a single `store` call, so readers only ever see whole
/// lists. The oldest entries are dropped once `limit` is exceeded.
pub struct Journal {
    store: Arc<dyn KeyValueStore>,
    key: String,
    limit: usize,
    lock: Mutex<()>,
}

impl Journal {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, limit: usize) -> Self {
        Self {
            store,
            key: key.into(),
            limit: limit.max(1),
            lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub async fn append(&self, entry: JournalEntry) -> Result<(), TaskError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load_entries().await?;
        entries.push(entry);
        if entries.len() > self.limit {
            let excess = entries.len() - self.limit;
            entries.drain(..excess);
        }
        self.save_entries(&entries).await?;
        debug!(operation = "journal_append", key = %self.key, len = entries.len(), "Journal updated");
        Ok(())
    }

    /// All entries, oldest first
    pub async fn entries(&self) -> Result<Vec<JournalEntry>, TaskError> {
        let _guard = self.lock.lock().await;
        self.load_entries().await
    }

    /// Up to `n` entries, most recent first
    pub async fn recent(&self, n: usize) -> Result<Vec<JournalEntry>, TaskError> {
        let entries = self.entries().await?;
        Ok(entries.into_iter().rev().take(n).collect())
    }

    pub async fn clear(&self) -> Result<(), TaskError> {
        let _guard = self.lock.lock().await;
        self.save_entries(&[]).await
    }

    async fn load_entries(&self) -> Result<Vec<JournalEntry>, TaskError> {
        let value = self
            .store
            .load(&self.key)
            .await
            .map_err(|e| TaskError::Journal(format!("failed to load '{}': {}", self.key, e)))?;
        match value {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => match serde_json::from_value(value) {
                Ok(entries) => Ok(entries),
                Err(e) => {
                    warn!(
                        operation = "journal_load",
                        key = %self.key,
                        error = %e,
                        "Stored journal is unreadable, starting a new one"
                    );
                    Ok(Vec::new())
                }
            },
        }
    }

    async fn save_entries(&self, entries: &[JournalEntry]) -> Result<(), TaskError> {
        let value = serde_json::to_value(entries)
            .map_err(|e| TaskError::Journal(format!("failed to encode '{}': {}", self.key, e)))?;
        self.store
            .store(&self.key, value)
            .await
            .map_err(|e| TaskError::Journal(format!("failed to store '{}': {}", self.key, e)))
    }
}
