use async_trait::async_trait;
use curator_models::FileRef;
use std::io::ErrorKind;
use tracing::{debug, info, warn};
use crate::error::SourceError;
use crate::traits::FileStorage;

/// Deletes files on the local filesystem (`storage = "local"`)
#[derive(Debug, Clone, Default)]
pub struct LocalFileStorage;

impl LocalFileStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn delete_file(&self, file: &FileRef) -> Result<bool, SourceError> {
        if file.storage != "local" {
            return Err(SourceError::NotConfigured(format!("storage '{}'", file.storage)));
        }

        let metadata = match tokio::fs::metadata(&file.path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(operation = "delete_file", path = %file.path.display(), "File already absent");
                return Ok(true);
            }
            Err(e) => return Err(e.into()),
        };

        // Only files are removed; a directory may hold other titles
        if metadata.is_dir() {
            warn!(operation = "delete_file", path = %file.path.display(), "Path is a directory, not deleting");
            return Ok(false);
        }

        match tokio::fs::remove_file(&file.path).await {
            Ok(()) => {
                info!(operation = "delete_file", path = %file.path.display(), "Deleted file");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }
}
