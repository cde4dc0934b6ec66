//! Anthropic Bridge: one non-streamed call to the Messages API per chat request.
//! No retry; the first failure is what the caller sees.

use crate::config::{ProxyConfig, DEFAULT_API_BASE, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use crate::conversation::ConversationTurn;
use crate::error::{ConfigError, UpstreamError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
const MESSAGES_PATH: &str = "/v1/messages";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Seam between the chat pipeline and whatever produces the reply text.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        history: &[ConversationTurn],
    ) -> Result<String, UpstreamError>;
}

#[derive(Serialize)]
struct UpstreamMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Messages API request body.
#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<UpstreamMessage<'a>>,
}

/// Messages API response envelope; only the fields we read.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

pub struct AnthropicBridge {
    api_key: String,
    model: String,
    max_tokens: u32,
    endpoint: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicBridge")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl AnthropicBridge {
    /// Bridge with default model, token limit and endpoint. Rejects an empty key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            endpoint: messages_endpoint(DEFAULT_API_BASE),
            client: build_client(DEFAULT_TIMEOUT)?,
        })
    }

    pub fn from_config(cfg: &ProxyConfig) -> Result<Self, ConfigError> {
        let key = cfg.api_key.clone().ok_or(ConfigError::MissingApiKey)?;
        Self::new(key)?
            .with_model(&cfg.model)
            .with_max_tokens(cfg.max_tokens)
            .with_api_base(&cfg.api_base)
            .with_timeout(cfg.upstream_timeout())
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Base URL without the `/v1/messages` suffix (e.g. a mock server in tests).
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.endpoint = messages_endpoint(api_base);
        self
    }

    /// Rebuilds the HTTP client with `timeout` applied to the whole request.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// POST the prompt and history, return the first content block's text.
    pub async fn send(
        &self,
        system: &str,
        history: &[ConversationTurn],
    ) -> Result<String, UpstreamError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: history
                .iter()
                .filter(|t| t.role.is_forwarded())
                .map(|t| UpstreamMessage {
                    role: t.role.as_str(),
                    content: &t.content,
                })
                .collect(),
        };

        tracing::debug!(
            model = %self.model,
            turns = body.messages.len(),
            system_bytes = system.len(),
            "anthropic: sending messages request"
        );

        let res = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(UpstreamError::Network)?;

        let status = res.status();
        let text = res.text().await.map_err(UpstreamError::Network)?;

        if !status.is_success() {
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        extract_reply(&text)
    }
}

#[async_trait]
impl ChatCompletion for AnthropicBridge {
    async fn complete(
        &self,
        system: &str,
        history: &[ConversationTurn],
    ) -> Result<String, UpstreamError> {
        self.send(system, history).await
    }
}

fn messages_endpoint(api_base: &str) -> String {
    format!("{}{}", api_base.trim_end_matches('/'), MESSAGES_PATH)
}

fn build_client(timeout: Duration) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(ConfigError::HttpClient)
}

/// Validate the envelope and pull out the first block's text.
fn extract_reply(body: &str) -> Result<String, UpstreamError> {
    let parsed: MessagesResponse =
        serde_json::from_str(body).map_err(|e| UpstreamError::Malformed(e.to_string()))?;

    let first = parsed
        .content
        .into_iter()
        .next()
        .ok_or_else(|| UpstreamError::Malformed("empty content array".to_string()))?;

    first.text.ok_or_else(|| {
        UpstreamError::Malformed(format!(
            "first content block has no text (type: {})",
            first.kind.as_deref().unwrap_or("unknown")
        ))
    })
}
