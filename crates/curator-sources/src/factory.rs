//! Builds the collaborator set the tasks run against from configuration

use anyhow::Result;
use curator_config::{Config, PathManager};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use crate::gemini::GeminiRecommender;
use crate::local::{FileStateStore, JsonHostStore, LocalFileStorage};
use crate::notify::{LogNotifier, WebhookNotifier};
use crate::tmdb::TmdbRecognizer;
use crate::traits::{
    FileStorage, HistoryStore, KeyValueStore, LibraryIndex, Notifier, Recognizer, Recommender, SubscriptionService,
};

/// Every collaborator a task may need, behind trait objects
#[derive(Clone)]
pub struct Collaborators {
    pub history: Arc<dyn HistoryStore>,
    pub storage: Arc<dyn FileStorage>,
    pub recognizer: Arc<dyn Recognizer>,
    pub subscriptions: Arc<dyn SubscriptionService>,
    pub library: Arc<dyn LibraryIndex>,
    pub recommender: Arc<dyn Recommender>,
    pub notifier: Arc<dyn Notifier>,
    pub state: Arc<dyn KeyValueStore>,
}

impl Collaborators {
    /// Wire the local adapters and HTTP clients described by `config`
    ///
    /// Host snapshot and state file fall back to the data directory of `paths`.
    pub fn from_config(config: &Config, paths: &PathManager) -> Result<Self> {
        let snapshot_path = config
            .host
            .snapshot
            .clone()
            .unwrap_or_else(|| paths.host_snapshot_file());
        let state_path = config.host.state.clone().unwrap_or_else(|| paths.state_file());
        debug!(
            operation = "collaborators_init",
            snapshot = %snapshot_path.display(),
            state = %state_path.display(),
            "Opening host snapshot and state"
        );

        let host = Arc::new(JsonHostStore::open(&snapshot_path)?);
        let state = Arc::new(FileStateStore::open(state_path)?);

        let recognizer = Arc::new(TmdbRecognizer::new(
            config.tmdb.api_key.clone(),
            config.tmdb.language.clone(),
            Duration::from_secs(config.tmdb.request_timeout_secs),
        )?);
        let recommender = Arc::new(GeminiRecommender::new(
            config.acquisition.api_key.clone(),
            config.acquisition.model.clone(),
            Duration::from_secs(config.acquisition.request_timeout_secs),
        )?);

        let notifier: Arc<dyn Notifier> = match config.notify.webhook_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Arc::new(WebhookNotifier::new(url.trim().to_string())?),
            _ => Arc::new(LogNotifier),
        };

        Ok(Self {
            history: host.clone(),
            storage: Arc::new(LocalFileStorage::new()),
            recognizer,
            subscriptions: host.clone(),
            library: host,
            recommender,
            notifier,
            state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_from_config_with_empty_data_dir() {
        let dir = tempdir().unwrap();
        let paths = PathManager::with_base(dir.path());
        let collaborators = Collaborators::from_config(&Config::default(), &paths).unwrap();

        assert!(collaborators.history.list_history().await.unwrap().is_empty());
        assert!(collaborators.state.load("cleanup_journal").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_from_config_with_webhook() {
        let dir = tempdir().unwrap();
        let paths = PathManager::with_base(dir.path());
        let mut config = Config::default();
        config.notify.webhook_url = Some("http://127.0.0.1:9/hook".to_string());
        config.tmdb.request_timeout_secs = 5;
        assert!(Collaborators::from_config(&config, &paths).is_ok());
    }
}
