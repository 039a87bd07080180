//! HTTP chat gateway for OpenAI-compatible providers.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::diagnostics::{DiagnosticKind, DiagnosticsLog};
use super::endpoint::resolve_endpoint;
use crate::ports::{ChatGateway, ChatMessage, GatewayConfig, GatewayError};

/// Gateway speaking the OpenAI-compatible chat-completion protocol.
pub struct HttpChatGateway {
    client: Client,
    diagnostics: Arc<DiagnosticsLog>,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl HttpChatGateway {
    pub fn new() -> Self {
        Self::with_diagnostics(Arc::new(DiagnosticsLog::new()))
    }

    pub fn with_diagnostics(diagnostics: Arc<DiagnosticsLog>) -> Self {
        Self {
            // Timeouts are applied per request from the resolved config.
            client: Client::new(),
            diagnostics,
        }
    }

    pub fn diagnostics(&self) -> &Arc<DiagnosticsLog> {
        &self.diagnostics
    }
}

impl Default for HttpChatGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatGateway for HttpChatGateway {
    async fn invoke(
        &self,
        messages: &[ChatMessage],
        config: &GatewayConfig,
    ) -> Result<String, GatewayError> {
        if !config.has_key() || config.base_url.trim().is_empty() {
            self.diagnostics
                .record(DiagnosticKind::Error, "missing credentials");
            return Err(GatewayError::MissingCredentials);
        }

        let endpoint = resolve_endpoint(&config.base_url, &config.model);
        let body = ChatCompletionRequest {
            model: &endpoint.model,
            messages,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            stream: false,
        };
        self.diagnostics.record(
            DiagnosticKind::Request,
            format!(
                "POST {} model={} messages={}",
                endpoint.url,
                endpoint.model,
                messages.len()
            ),
        );
        tracing::debug!(url = %endpoint.url, model = %endpoint.model, "invoking chat completion");

        let response = self
            .client
            .post(&endpoint.url)
            .bearer_auth(config.api_key())
            .timeout(config.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let err = if e.is_timeout() {
                    GatewayError::Timeout {
                        timeout_secs: config.timeout.as_secs(),
                    }
                } else {
                    GatewayError::network(e.to_string())
                };
                self.diagnostics
                    .record(DiagnosticKind::Error, err.to_string());
                err
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = GatewayError::http(status.as_u16(), body);
            self.diagnostics
                .record(DiagnosticKind::Error, err.to_string());
            return Err(err);
        }

        let payload: ChatCompletionResponse = response.json().await.map_err(|e| {
            let err = GatewayError::network(format!("malformed response body: {e}"));
            self.diagnostics
                .record(DiagnosticKind::Error, err.to_string());
            err
        })?;

        let reply = payload
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        if reply.is_empty() {
            self.diagnostics
                .record(DiagnosticKind::Error, "empty reply");
            return Err(GatewayError::EmptyReply);
        }

        self.diagnostics.record(
            DiagnosticKind::Response,
            format!("{} chars", reply.chars().count()),
        );
        Ok(reply)
    }
}
