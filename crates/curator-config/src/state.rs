use anyhow::Result;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// File-backed key-value store for task state (journals and similar)
///
/// Values are JSON. `save` writes the whole map to a temp file and renames
/// it over the old one, so a reader never sees a half-written file.
pub struct StateStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl StateStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            values: Map::new(),
        }
    }

    /// Open and load in one step
    pub fn open(path: PathBuf) -> Result<Self> {
        let mut store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            self.values = if content.trim().is_empty() {
                Map::new()
            } else {
                serde_json::from_str(&content)?
            };
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.values)?;
        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: String, value: Value) {
        self.values.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_state_store_load_and_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut store = StateStore::new(path.clone());
        store.set("cleanup_journal".to_string(), serde_json::json!(["a", "b"]));
        store.set("counter".to_string(), Value::from(3));
        store.save().unwrap();
        assert!(!path.with_extension("tmp").exists());

        let loaded = StateStore::open(path).unwrap();
        assert_eq!(loaded.get("cleanup_journal"), Some(&serde_json::json!(["a", "b"])));
        assert_eq!(loaded.get("counter"), Some(&Value::from(3)));
    }

    #[test]
    fn test_state_store_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = StateStore::open(dir.path().join("missing.json")).unwrap();
        assert!(store.get("anything").is_none());
    }
}
