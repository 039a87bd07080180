//! Local storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where the history and preset files live.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory for the JSON records.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl StorageConfig {
    pub fn history_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("history.json")
    }

    pub fn presets_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("presets.json")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.data_dir.trim().is_empty() {
            return Err(ValidationError::EmptyStorageDir);
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String {
    "./data".to_string()
}
