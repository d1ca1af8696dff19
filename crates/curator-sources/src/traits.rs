use async_trait::async_trait;
use curator_models::{
    DownloadArtifact, FileRef, HistoryRecord, MediaIdentity, MediaKind, RecognizedMedia, SubscriptionOutcome,
    SubscriptionRequest, TransferRecord,
};
use serde_json::Value;
use crate::error::SourceError;

/// The host's history table and the download/transfer rows hanging off it
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// All records, most recently completed first
    async fn list_history(&self) -> Result<Vec<HistoryRecord>, SourceError>;

    async fn delete_history(&self, id: i64) -> Result<(), SourceError>;

    /// Downloads recorded for an identity (season only applies to TV)
    async fn downloads_for(&self, identity: &MediaIdentity) -> Result<Vec<DownloadArtifact>, SourceError>;

    async fn transfers_for(&self, download_hash: &str) -> Result<Vec<TransferRecord>, SourceError>;

    async fn history_contains(&self, tmdb_id: u32) -> Result<bool, SourceError> {
        Ok(self
            .list_history()
            .await?
            .iter()
            .any(|record| record.identity.tmdb_id == tmdb_id))
    }
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Delete one file. Ok(false) means the storage refused without an error.
    /// A file that is already gone counts as deleted.
    async fn delete_file(&self, file: &FileRef) -> Result<bool, SourceError>;
}

/// Media recognition: free title and year in, canonical identity out
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(
        &self,
        title: &str,
        year: Option<&str>,
        kind: MediaKind,
    ) -> Result<Option<RecognizedMedia>, SourceError>;
}

#[async_trait]
pub trait SubscriptionService: Send + Sync {
    async fn has_active(&self, tmdb_id: u32) -> Result<bool, SourceError>;

    async fn add(&self, request: &SubscriptionRequest) -> Result<SubscriptionOutcome, SourceError>;
}

/// What is already present in the media library
#[async_trait]
pub trait LibraryIndex: Send + Sync {
    async fn contains(&self, kind: MediaKind, tmdb_id: u32) -> Result<bool, SourceError>;
}

/// Text completion endpoint
///
/// Returns an empty string on any failure; callers treat it as "no result".
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn complete(&self, prompt: &str) -> String;
}

/// Fire-and-forget message sink; implementations log their own failures
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, body: &str);
}

/// Persistent key-value store for task state
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<Value>, SourceError>;

    /// Replace the value under `key` as a single write
    async fn store(&self, key: &str, value: Value) -> Result<(), SourceError>;
}
