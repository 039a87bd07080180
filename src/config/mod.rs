//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the `DEEPMINER`
//! prefix and nested keys use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use deepminer::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;
mod gateway;
mod storage;

pub use error::{ConfigError, ValidationError};
pub use gateway::GatewayDefaults;
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Chat gateway defaults (provider, credentials, sampling)
    #[serde(default)]
    pub gateway: GatewayDefaults,

    /// Local storage locations
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Environment Variable Format
    ///
    /// - `DEEPMINER__GATEWAY__API_KEY=sk-...` -> `gateway.api_key`
    /// - `DEEPMINER__GATEWAY__BASE_URL=...`   -> `gateway.base_url`
    /// - `DEEPMINER__STORAGE__DATA_DIR=...`   -> `storage.data_dir`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the expected
    /// types. Every field has a default, so an empty environment loads.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("DEEPMINER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.gateway.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}
