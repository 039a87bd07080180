//! Preset Store Port - persistence for provider credential presets.
//!
//! Presets are user-managed gateway configurations. At rest the API keys are
//! base64-obfuscated; this is explicitly not a security control, only a
//! shoulder-surfing courtesy for a local file.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::chat_gateway::GatewayConfig;

/// Hard cap on stored presets.
pub const MAX_PRESETS: usize = 10;

/// One saved provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialPreset {
    pub id: String,
    pub name: String,
    pub provider: String,
    /// Plaintext in memory; obfuscated by the store adapter at rest.
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(default)]
    pub is_default: bool,
}

impl CredentialPreset {
    /// Builds the runtime gateway config this preset describes. Presets do
    /// not carry a timeout; the request timeout stays at its default.
    pub fn to_gateway_config(&self) -> GatewayConfig {
        GatewayConfig::new(
            self.provider.clone(),
            self.api_key.clone(),
            self.base_url.clone(),
            self.model.clone(),
        )
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens)
    }
}

/// Errors raised by preset persistence and list rules.
#[derive(Debug, Error)]
pub enum PresetError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to serialize presets: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize presets: {0}")]
    DeserializationFailed(String),

    #[error("Maximum {MAX_PRESETS} presets allowed")]
    TooManyPresets,

    #[error("Cannot delete the last preset")]
    LastPreset,
}

/// Port for loading and saving the preset list.
#[async_trait]
pub trait PresetStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<CredentialPreset>, PresetError>;

    /// Replaces the saved list. Enforces the preset cap.
    async fn save_all(&self, presets: &[CredentialPreset]) -> Result<(), PresetError>;
}

/// Removes a preset from the list, refusing to delete the last one.
///
/// Unknown ids are a no-op so a stale UI cannot fail a delete twice.
pub fn remove_preset(
    presets: &mut Vec<CredentialPreset>,
    id: &str,
) -> Result<(), PresetError> {
    let Some(index) = presets.iter().position(|p| p.id == id) else {
        return Ok(());
    };
    if presets.len() == 1 {
        return Err(PresetError::LastPreset);
    }
    presets.remove(index);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_round_trips_through_json() {
        let preset = CredentialPreset {
            id: "p1".to_string(),
            name: "Work".to_string(),
            provider: "deepseek".to_string(),
            api_key: "sk-123".to_string(),
            base_url: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            is_default: false,
        };
        let json = serde_json::to_string(&preset).unwrap();
        let back: CredentialPreset = serde_json::from_str(&json).unwrap();
        assert_eq!(preset, back);
    }

    fn preset(id: &str) -> CredentialPreset {
        CredentialPreset {
            id: id.to_string(),
            name: id.to_string(),
            provider: "openai".to_string(),
            api_key: "sk".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4-turbo".to_string(),
            temperature: 0.6,
            max_tokens: 1000,
            is_default: false,
        }
    }

    #[test]
    fn remove_deletes_by_id() {
        let mut presets = vec![preset("a"), preset("b")];
        remove_preset(&mut presets, "a").unwrap();
        assert_eq!(presets.len(), 1);
        assert_eq!(presets[0].id, "b");
    }

    #[test]
    fn remove_refuses_the_last_preset() {
        let mut presets = vec![preset("only")];
        assert!(matches!(
            remove_preset(&mut presets, "only"),
            Err(PresetError::LastPreset)
        ));
        assert_eq!(presets.len(), 1);
    }

    #[test]
    fn remove_ignores_unknown_ids() {
        let mut presets = vec![preset("a")];
        remove_preset(&mut presets, "ghost").unwrap();
        assert_eq!(presets.len(), 1);
    }

    #[test]
    fn to_gateway_config_carries_every_preset_field() {
        let mut p = preset("work");
        p.api_key = "sk-work".to_string();
        p.temperature = 0.3;
        p.max_tokens = 500;
        let config = p.to_gateway_config();
        assert_eq!(config.api_key(), "sk-work");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-4-turbo");
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.max_tokens, 500);
    }

    #[test]
    fn is_default_defaults_to_false() {
        let json = r#"{
            "id": "p", "name": "n", "provider": "openai", "api_key": "",
            "base_url": "https://api.openai.com/v1", "model": "gpt-4-turbo",
            "temperature": 0.7, "max_tokens": 2000
        }"#;
        let preset: CredentialPreset = serde_json::from_str(json).unwrap();
        assert!(!preset.is_default);
    }
}
