//! File-based History Store Adapter
//!
//! Persists the whole history list as one JSON file, rewritten in full on
//! every save. A missing file is an empty history, not an error.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::session::HistoryItem;
use crate::ports::{HistoryStore, HistoryStoreError};

/// History persistence in a single JSON file.
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    async fn ensure_parent(&self) -> Result<(), HistoryStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| HistoryStoreError::Io(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    async fn load_all(&self) -> Result<Vec<HistoryItem>, HistoryStoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&self.path)
            .await
            .map_err(|e| HistoryStoreError::Io(e.to_string()))?;
        serde_json::from_str(&json)
            .map_err(|e| HistoryStoreError::DeserializationFailed(e.to_string()))
    }

    async fn save_all(&self, items: &[HistoryItem]) -> Result<(), HistoryStoreError> {
        self.ensure_parent().await?;
        let json = serde_json::to_string_pretty(items)
            .map_err(|e| HistoryStoreError::SerializationFailed(e.to_string()))?;
        fs::write(&self.path, json)
            .await
            .map_err(|e| HistoryStoreError::Io(e.to_string()))
    }
}
