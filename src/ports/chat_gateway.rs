//! Chat Gateway Port - Interface to external chat-completion providers.
//!
//! The engine treats the model call as a single async boundary: an ordered
//! message list goes in, raw text comes out. Transport failures propagate as
//! typed errors; the gateway never fabricates a successful-looking reply.

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Role of a message sender on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// System instructions (guides model behavior).
    System,
    /// User input.
    User,
    /// Assistant (model) response.
    Assistant,
}

/// A message in the provider-agnostic wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// Credentials and request parameters for one provider endpoint.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Provider label, informational only ("openai", "deepseek", "custom"...).
    pub provider: String,
    /// API key for bearer auth.
    api_key: Secret<String>,
    /// Base URL of an OpenAI-compatible API, possibly carrying a
    /// `target=vendor/model` query parameter.
    pub base_url: String,
    /// Model identifier; overridden by a `target=` parameter when present.
    pub model: String,
    /// Sampling temperature for judged calls.
    pub temperature: f32,
    /// Completion token cap.
    pub max_tokens: u32,
    /// Request timeout.
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Creates a config with the judged-call defaults.
    pub fn new(
        provider: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            api_key: Secret::new(api_key.into()),
            base_url: base_url.into(),
            model: model.into(),
            temperature: 0.6,
            max_tokens: 1000,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns true if a non-empty API key is present.
    pub fn has_key(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
    }

    /// Exposes the API key for request construction.
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Picks between an explicit per-session config and the process-wide
    /// default. The explicit config wins only when it carries a non-empty
    /// key; otherwise the default is used whole. Fields are never mixed
    /// across the two sources.
    pub fn resolve<'a>(explicit: Option<&'a Self>, fallback: &'a Self) -> &'a Self {
        match explicit {
            Some(config) if config.has_key() => config,
            _ => fallback,
        }
    }
}

/// Gateway failure modes.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No API key or base URL available from any config source.
    #[error("未配置 API Key 或 Base URL。请在系统设置中配置，或检查环境变量。")]
    MissingCredentials,

    /// The base URL could not be turned into an endpoint.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),

    /// Non-success HTTP status from the provider.
    #[error("API Error: {status} - {body}")]
    Http { status: u16, body: String },

    /// Network-level failure before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// Request exceeded the configured timeout.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The provider answered with no usable content.
    #[error("empty response from model")]
    EmptyReply,
}

impl GatewayError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }
}

/// Port for chat-completion calls.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Sends the assembled message list and returns the raw reply text.
    async fn invoke(
        &self,
        messages: &[ChatMessage],
        config: &GatewayConfig,
    ) -> Result<String, GatewayError>;
}
