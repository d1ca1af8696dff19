use async_trait::async_trait;
use curator_config::StateStore;
use serde_json::Value;
use std::path::PathBuf;
use tokio::sync::Mutex;
use crate::error::SourceError;
use crate::traits::KeyValueStore;

/// `KeyValueStore` over the JSON state file
///
/// Every `store` reloads the file, replaces one key and writes the whole file
/// back atomically, all under one lock.
pub struct FileStateStore {
    inner: Mutex<StateStore>,
}

impl FileStateStore {
    pub fn open(path: PathBuf) -> Result<Self, SourceError> {
        let store = StateStore::open(path).map_err(|e| SourceError::new(format!("Failed to open state file: {}", e)))?;
        Ok(Self { inner: Mutex::new(store) })
    }
}

#[async_trait]
impl KeyValueStore for FileStateStore {
    async fn load(&self, key: &str) -> Result<Option<Value>, SourceError> {
        let mut store = self.inner.lock().await;
        store
            .load()
            .map_err(|e| SourceError::new(format!("Failed to read state file: {}", e)))?;
        Ok(store.get(key).cloned())
    }

    async fn store(&self, key: &str, value: Value) -> Result<(), SourceError> {
        let mut store = self.inner.lock().await;
        store
            .load()
            .map_err(|e| SourceError::new(format!("Failed to read state file: {}", e)))?;
        store.set(key.to_string(), value);
        store
            .save()
            .map_err(|e| SourceError::new(format!("Failed to write state file: {}", e)))
    }
}
