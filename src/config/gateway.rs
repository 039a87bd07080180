//! Gateway (LLM provider) configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::ports::GatewayConfig;

/// Process-wide default credentials for the chat gateway.
///
/// Per-session presets override these wholesale when they carry a key;
/// fields are never mixed between the two sources.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayDefaults {
    /// Provider label, informational only.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// API key; an empty key selects the offline mock gateway.
    #[serde(default)]
    pub api_key: String,

    /// OpenAI-compatible base URL, possibly carrying a `target=` parameter.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl GatewayDefaults {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// True when a non-empty API key is configured.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Builds the runtime gateway config from these defaults.
    pub fn to_gateway_config(&self) -> GatewayConfig {
        GatewayConfig::new(
            self.provider.clone(),
            self.api_key.clone(),
            self.base_url.clone(),
            self.model.clone(),
        )
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens)
        .with_timeout(self.timeout())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        if self.max_tokens == 0 {
            return Err(ValidationError::InvalidMaxTokens);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.has_credentials() && self.base_url.trim().is_empty() {
            return Err(ValidationError::InvalidBaseUrl(
                "base_url required when an api_key is set".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GatewayDefaults {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_provider() -> String {
    "deepseek".to_string()
}

fn default_base_url() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_temperature() -> f32 {
    0.6
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_timeout() -> u64 {
    60
}
