//! File-based Preset Store Adapter
//!
//! Persists credential presets as one JSON file. API keys are
//! base64-obfuscated at rest; keys that fail to decode are assumed to be
//! legacy plaintext and loaded as-is.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ports::{CredentialPreset, PresetError, PresetStore, MAX_PRESETS};

/// Preset persistence in a single JSON file.
#[derive(Debug, Clone)]
pub struct FilePresetStore {
    path: PathBuf,
}

impl FilePresetStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn obfuscate(key: &str) -> String {
        BASE64.encode(key)
    }

    fn deobfuscate(stored: &str) -> String {
        BASE64
            .decode(stored)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .unwrap_or_else(|| stored.to_string())
    }

    async fn ensure_parent(&self) -> Result<(), PresetError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PresetError::Io(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl PresetStore for FilePresetStore {
    async fn load_all(&self) -> Result<Vec<CredentialPreset>, PresetError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&self.path)
            .await
            .map_err(|e| PresetError::Io(e.to_string()))?;
        let mut presets: Vec<CredentialPreset> = serde_json::from_str(&json)
            .map_err(|e| PresetError::DeserializationFailed(e.to_string()))?;
        for preset in &mut presets {
            preset.api_key = Self::deobfuscate(&preset.api_key);
        }
        Ok(presets)
    }

    async fn save_all(&self, presets: &[CredentialPreset]) -> Result<(), PresetError> {
        if presets.len() > MAX_PRESETS {
            return Err(PresetError::TooManyPresets);
        }
        self.ensure_parent().await?;

        let at_rest: Vec<CredentialPreset> = presets
            .iter()
            .cloned()
            .map(|mut p| {
                p.api_key = Self::obfuscate(&p.api_key);
                p
            })
            .collect();
        let json = serde_json::to_string_pretty(&at_rest)
            .map_err(|e| PresetError::SerializationFailed(e.to_string()))?;
        fs::write(&self.path, json)
            .await
            .map_err(|e| PresetError::Io(e.to_string()))
    }
}
