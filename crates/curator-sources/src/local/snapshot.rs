use async_trait::async_trait;
use curator_models::{
    DownloadArtifact, HistoryRecord, MediaIdentity, MediaKind, SubscriptionOutcome, SubscriptionRequest,
    TransferRecord,
};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};
use crate::error::SourceError;
use crate::traits::{HistoryStore, LibraryIndex, SubscriptionService};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionEntry {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    pub kind: MediaKind,
    pub tmdb_id: u32,
    #[serde(default)]
    pub owner_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_path: Option<String>,
    #[serde(default)]
    pub sites: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryItem {
    pub kind: MediaKind,
    pub tmdb_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Export of the host database tables this tool reads and writes
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HostSnapshot {
    #[serde(default)]
    pub history: Vec<HistoryRecord>,
    #[serde(default)]
    pub downloads: Vec<DownloadArtifact>,
    #[serde(default)]
    pub transfers: Vec<TransferRecord>,
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionEntry>,
    #[serde(default)]
    pub library: Vec<LibraryItem>,
}

/// Host collaborators backed by a JSON snapshot file
///
/// Mutations are applied to a copy, written back (temp file + rename) and
/// only then swapped in, so a failed write leaves memory and disk in step.
/// Without a path the store lives in memory only.
pub struct JsonHostStore {
    path: Option<PathBuf>,
    data: Mutex<HostSnapshot>,
}

impl JsonHostStore {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let data = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            debug!(operation = "host_snapshot_open", path = %path.display(), "Snapshot missing, starting empty");
            HostSnapshot::default()
        };
        Ok(Self {
            path: Some(path.to_path_buf()),
            data: Mutex::new(data),
        })
    }

    pub fn in_memory(data: HostSnapshot) -> Self {
        Self {
            path: None,
            data: Mutex::new(data),
        }
    }

    fn persist(&self, data: &HostSnapshot) -> Result<(), SourceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(data)?;
        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, path)?;
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for JsonHostStore {
    async fn list_history(&self) -> Result<Vec<HistoryRecord>, SourceError> {
        let data = self.data.lock().await;
        let mut records = data.history.clone();
        // Newest first; unparseable timestamps sort last
        records.sort_by_key(|record| Reverse(record.completed_at_utc()));
        Ok(records)
    }

    async fn delete_history(&self, id: i64) -> Result<(), SourceError> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        next.history.retain(|record| record.id != id);
        if next.history.len() == data.history.len() {
            return Err(SourceError::new(format!("History record {} not found", id)));
        }
        self.persist(&next)?;
        *data = next;
        info!(operation = "delete_history", id = id, "Deleted history record");
        Ok(())
    }

    async fn downloads_for(&self, identity: &MediaIdentity) -> Result<Vec<DownloadArtifact>, SourceError> {
        let data = self.data.lock().await;
        Ok(data
            .downloads
            .iter()
            .filter(|download| download.identity.matches(identity))
            .cloned()
            .collect())
    }

    async fn transfers_for(&self, download_hash: &str) -> Result<Vec<TransferRecord>, SourceError> {
        let data = self.data.lock().await;
        Ok(data
            .transfers
            .iter()
            .filter(|transfer| transfer.download_hash == download_hash)
            .cloned()
            .collect())
    }

    async fn history_contains(&self, tmdb_id: u32) -> Result<bool, SourceError> {
        let data = self.data.lock().await;
        Ok(data.history.iter().any(|record| record.identity.tmdb_id == tmdb_id))
    }
}

#[async_trait]
impl SubscriptionService for JsonHostStore {
    async fn has_active(&self, tmdb_id: u32) -> Result<bool, SourceError> {
        let data = self.data.lock().await;
        Ok(data.subscriptions.iter().any(|sub| sub.tmdb_id == tmdb_id))
    }

    async fn add(&self, request: &SubscriptionRequest) -> Result<SubscriptionOutcome, SourceError> {
        let mut data = self.data.lock().await;
        if let Some(existing) = data
            .subscriptions
            .iter()
            .find(|sub| sub.tmdb_id == request.tmdb_id && sub.kind == request.kind)
        {
            return Ok(SubscriptionOutcome {
                id: Some(existing.id),
                message: "subscription already exists".to_string(),
            });
        }

        let id = data.subscriptions.iter().map(|sub| sub.id).max().unwrap_or(0) + 1;
        let mut next = data.clone();
        next.subscriptions.push(SubscriptionEntry {
            id,
            title: request.title.clone(),
            year: request.year.clone(),
            kind: request.kind,
            tmdb_id: request.tmdb_id,
            owner_tag: request.owner_tag.clone(),
            save_path: request.save_path.clone(),
            sites: request.sites.clone(),
        });
        self.persist(&next)?;
        *data = next;
        Ok(SubscriptionOutcome {
            id: Some(id),
            message: "subscription added".to_string(),
        })
    }
}

#[async_trait]
impl LibraryIndex for JsonHostStore {
    async fn contains(&self, kind: MediaKind, tmdb_id: u32) -> Result<bool, SourceError> {
        let data = self.data.lock().await;
        Ok(data
            .library
            .iter()
            .any(|item| item.kind == kind && item.tmdb_id == tmdb_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(id: i64, tmdb_id: u32, completed_at: &str) -> HistoryRecord {
        HistoryRecord {
            id,
            identity: MediaIdentity::movie(tmdb_id),
            name: format!("Movie {}", id),
            username: Some("alice".to_string()),
            completed_at: completed_at.to_string(),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_list_history_most_recent_first() {
        let store = JsonHostStore::in_memory(HostSnapshot {
            history: vec![
                record(1, 10, "2024-01-01 08:00:00"),
                record(2, 11, "2024-03-01 08:00:00"),
                record(3, 12, "2024-02-01 08:00:00"),
                record(4, 13, "not a date"),
                record(5, 14, "2024-02-15T09:00:00+08:00"),
                record(6, 15, "2024-02-15 02:00:00"),
            ],
            ..HostSnapshot::default()
        });
        let ids: Vec<i64> = store.list_history().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 6, 5, 3, 1, 4]);
        assert!(store.history_contains(12).await.unwrap());
        assert!(!store.history_contains(99).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_history_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("host.json");
        let snapshot = HostSnapshot {
            history: vec![record(1, 10, "2024-01-01 08:00:00")],
            ..HostSnapshot::default()
        };
        std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

        let store = JsonHostStore::open(&path).unwrap();
        store.delete_history(1).await.unwrap();
        assert!(store.delete_history(1).await.is_err());

        let reopened = JsonHostStore::open(&path).unwrap();
        assert!(reopened.list_history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_downloads_match_tv_season() {
        let store = JsonHostStore::in_memory(HostSnapshot {
            downloads: vec![
                DownloadArtifact { hash: "a".into(), identity: MediaIdentity::tv(5, Some(1)), title: None },
                DownloadArtifact { hash: "b".into(), identity: MediaIdentity::tv(5, Some(2)), title: None },
            ],
            ..HostSnapshot::default()
        });
        let found = store.downloads_for(&MediaIdentity::tv(5, Some(2))).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].hash, "b");
    }

    #[tokio::test]
    async fn test_add_subscription_assigns_id_once() {
        let store = JsonHostStore::in_memory(HostSnapshot::default());
        let request = SubscriptionRequest {
            title: "Up".into(),
            year: Some("2009".into()),
            kind: MediaKind::Movie,
            tmdb_id: 14160,
            owner_tag: "acquisition".into(),
            save_path: None,
            sites: vec![],
        };
        let first = store.add(&request).await.unwrap();
        let second = store.add(&request).await.unwrap();
        assert_eq!(first.id, Some(1));
        assert_eq!(second.id, Some(1));
        assert!(store.has_active(14160).await.unwrap());
        assert!(!store.contains(MediaKind::Movie, 14160).await.unwrap());
    }

    fn blocked_store(dir: &Path, snapshot: &HostSnapshot) -> JsonHostStore {
        let path = dir.join("host.json");
        std::fs::write(&path, serde_json::to_string(snapshot).unwrap()).unwrap();
        let store = JsonHostStore::open(&path).unwrap();
        // A directory where the temp file goes makes every write fail
        std::fs::create_dir(path.with_extension("tmp")).unwrap();
        store
    }

    #[tokio::test]
    async fn test_failed_write_keeps_history() {
        let dir = tempdir().unwrap();
        let snapshot = HostSnapshot {
            history: vec![record(1, 10, "2024-01-01 08:00:00")],
            ..HostSnapshot::default()
        };
        let store = blocked_store(dir.path(), &snapshot);

        assert!(store.delete_history(1).await.is_err());
        assert_eq!(store.list_history().await.unwrap().len(), 1);
        assert!(store.history_contains(10).await.unwrap());

        let reopened = JsonHostStore::open(&dir.path().join("host.json")).unwrap();
        assert_eq!(reopened.list_history().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_subscriptions() {
        let dir = tempdir().unwrap();
        let store = blocked_store(dir.path(), &HostSnapshot::default());
        let request = SubscriptionRequest {
            title: "Up".into(),
            year: None,
            kind: MediaKind::Movie,
            tmdb_id: 14160,
            owner_tag: "acquisition".into(),
            save_path: None,
            sites: vec![],
        };

        assert!(store.add(&request).await.is_err());
        assert!(!store.has_active(14160).await.unwrap());
    }
}
