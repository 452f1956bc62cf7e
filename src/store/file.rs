//! JSON file persistence for [`InventoryStore`].

use super::InventoryStore;
use crate::error::StoreError;
use std::fs;
use std::path::{Path, PathBuf};

/// A store saved as a single JSON document.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the store. A missing file yields an empty store.
    pub fn load(&self) -> Result<InventoryStore, StoreError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No store file, starting empty");
            return Ok(InventoryStore::new());
        }
        let data = fs::read(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        let store: InventoryStore = serde_json::from_slice(&data)?;
        tracing::debug!(path = %self.path.display(), counts = ?store.counts(), "Loaded store");
        Ok(store)
    }

    /// Save the store, replacing the file atomically.
    pub fn save(&self, store: &InventoryStore) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(store)?;
        fs::write(&tmp, data).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), "Saved store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InventoryItem, Project};

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("absent.json")).load().unwrap();
        assert_eq!(store.counts().projects, 0);
    }

    #[test]
    fn test_save_and_reload_keeps_keys() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonStore::new(dir.path().join("nested/store.json"));

        let mut store = InventoryStore::new();
        let project = store.create_project(Project::new("demo", None));
        let item = store
            .upsert_item(project, "SPDXRef-a", || InventoryItem::new(project, "SPDXRef-a", "a"))
            .id;
        file.save(&store).unwrap();

        let reloaded = file.load().unwrap();
        assert_eq!(reloaded.counts(), store.counts());
        assert_eq!(reloaded.find_item(project, "SPDXRef-a"), Some(item));
    }
}
