//! Ports: interfaces between the engine and the outside world.

mod chat_gateway;
mod history_store;
mod preset_store;

pub use chat_gateway::{ChatGateway, ChatMessage, ChatRole, GatewayConfig, GatewayError};
pub use history_store::{HistoryStore, HistoryStoreError};
pub use preset_store::{remove_preset, CredentialPreset, PresetError, PresetStore, MAX_PRESETS};
