use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use crate::media::MediaIdentity;

/// Reference to a file on one of the host's storages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRef {
    #[serde(default = "default_storage")]
    pub storage: String,
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

fn default_storage() -> String {
    "local".to_string()
}

impl FileRef {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self { storage: default_storage(), path: path.into(), size: None }
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.storage, self.path.display())
    }
}

/// Downloaded unit linked to a history record by catalog identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DownloadArtifact {
    pub hash: String,
    pub identity: MediaIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A file moved or linked from a download into the library
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransferRecord {
    pub download_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<FileRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<FileRef>,
}
