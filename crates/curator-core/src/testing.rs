//! In-memory collaborators for unit tests

use async_trait::async_trait;
use curator_models::{
    DownloadArtifact, FileRef, HistoryRecord, MediaIdentity, MediaKind, RecognizedMedia, SubscriptionOutcome,
    SubscriptionRequest, TransferRecord,
};
use curator_sources::{
    Collaborators, FileStorage, HistoryStore, KeyValueStore, LibraryIndex, Notifier, Recognizer, Recommender,
    SourceError, SubscriptionService,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct FakeHost {
    pub history: Mutex<Vec<HistoryRecord>>,
    pub downloads: Vec<DownloadArtifact>,
    pub transfers: Vec<TransferRecord>,
    pub active: HashSet<u32>,
    pub library: HashSet<u32>,
    pub added: Mutex<Vec<SubscriptionRequest>>,
    pub deleted: Mutex<Vec<i64>>,
    pub fail_list: bool,
    pub fail_add: HashSet<u32>,
    pub fail_add_once: Mutex<HashSet<u32>>,
    pub fail_delete: HashSet<i64>,
}

impl FakeHost {
    pub fn with_history(records: Vec<HistoryRecord>) -> Self {
        Self { history: Mutex::new(records), ..Self::default() }
    }

    pub fn added_ids(&self) -> Vec<u32> {
        self.added.lock().unwrap().iter().map(|r| r.tmdb_id).collect()
    }

    pub fn deleted_ids(&self) -> Vec<i64> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl HistoryStore for FakeHost {
    async fn list_history(&self) -> Result<Vec<HistoryRecord>, SourceError> {
        if self.fail_list {
            return Err(SourceError::new("database unavailable"));
        }
        Ok(self.history.lock().unwrap().clone())
    }

    async fn delete_history(&self, id: i64) -> Result<(), SourceError> {
        if self.fail_delete.contains(&id) {
            return Err(SourceError::new("record is locked"));
        }
        self.history.lock().unwrap().retain(|r| r.id != id);
        self.deleted.lock().unwrap().push(id);
        Ok(())
    }

    async fn downloads_for(&self, identity: &MediaIdentity) -> Result<Vec<DownloadArtifact>, SourceError> {
        Ok(self.downloads.iter().filter(|d| d.identity.matches(identity)).cloned().collect())
    }

    async fn transfers_for(&self, download_hash: &str) -> Result<Vec<TransferRecord>, SourceError> {
        Ok(self.transfers.iter().filter(|t| t.download_hash == download_hash).cloned().collect())
    }
}

#[async_trait]
impl SubscriptionService for FakeHost {
    async fn has_active(&self, tmdb_id: u32) -> Result<bool, SourceError> {
        Ok(self.active.contains(&tmdb_id) || self.added_ids().contains(&tmdb_id))
    }

    async fn add(&self, request: &SubscriptionRequest) -> Result<SubscriptionOutcome, SourceError> {
        if self.fail_add.contains(&request.tmdb_id) {
            return Err(SourceError::new("subscription service down"));
        }
        if self.fail_add_once.lock().unwrap().remove(&request.tmdb_id) {
            return Err(SourceError::new("subscription service timed out"));
        }
        let mut added = self.added.lock().unwrap();
        added.push(request.clone());
        Ok(SubscriptionOutcome { id: Some(added.len() as i64), message: "ok".to_string() })
    }
}

#[async_trait]
impl LibraryIndex for FakeHost {
    async fn contains(&self, _kind: MediaKind, tmdb_id: u32) -> Result<bool, SourceError> {
        Ok(self.library.contains(&tmdb_id))
    }
}

/// Records deletions; paths in `failing` error out
#[derive(Default)]
pub struct FakeStorage {
    pub failing: HashSet<PathBuf>,
    pub attempted: Mutex<Vec<PathBuf>>,
}

impl FakeStorage {
    pub fn failing(paths: &[&str]) -> Self {
        Self {
            failing: paths.iter().map(PathBuf::from).collect(),
            ..Self::default()
        }
    }

    pub fn attempted(&self) -> Vec<PathBuf> {
        self.attempted.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileStorage for FakeStorage {
    async fn delete_file(&self, file: &FileRef) -> Result<bool, SourceError> {
        self.attempted.lock().unwrap().push(file.path.clone());
        if self.failing.contains(&file.path) {
            return Err(SourceError::new("permission denied"));
        }
        Ok(true)
    }
}

pub struct FakeRecommender {
    pub response: String,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeRecommender {
    pub fn new(response: &str) -> Self {
        Self { response: response.to_string(), prompts: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl Recommender for FakeRecommender {
    async fn complete(&self, prompt: &str) -> String {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.response.clone()
    }
}

/// Recognizes titles from a fixed table
#[derive(Default)]
pub struct FakeRecognizer {
    pub known: HashMap<String, u32>,
    pub failing: HashSet<String>,
}

impl FakeRecognizer {
    pub fn with(entries: &[(&str, u32)]) -> Self {
        Self {
            known: entries.iter().map(|(title, id)| (title.to_string(), *id)).collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Recognizer for FakeRecognizer {
    async fn recognize(
        &self,
        title: &str,
        year: Option<&str>,
        _kind: MediaKind,
    ) -> Result<Option<RecognizedMedia>, SourceError> {
        if self.failing.contains(title) {
            return Err(SourceError::new("recognition timeout"));
        }
        Ok(self.known.get(title).map(|id| RecognizedMedia {
            tmdb_id: *id,
            title: title.to_string(),
            year: year.map(str::to_string),
            poster: Some(format!("https://image.example/{}.jpg", id)),
        }))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, title: &str, body: &str) {
        self.messages.lock().unwrap().push((title.to_string(), body.to_string()));
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub values: Mutex<HashMap<String, Value>>,
    pub writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<Value>, SourceError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn store(&self, key: &str, value: Value) -> Result<(), SourceError> {
        self.values.lock().unwrap().insert(key.to_string(), value);
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }
}

/// Collaborator set over the fakes; recognizer and recommender start empty
pub fn collaborators(
    host: Arc<FakeHost>,
    storage: Arc<FakeStorage>,
    state: Arc<MemoryStore>,
    notifier: Arc<RecordingNotifier>,
) -> Collaborators {
    Collaborators {
        history: host.clone(),
        storage,
        recognizer: Arc::new(FakeRecognizer::default()),
        subscriptions: host.clone(),
        library: host,
        recommender: Arc::new(FakeRecommender::new("")),
        notifier,
        state,
    }
}
