//! Error types for the Pochi core.
//!
//! Both enums render as a single line so the gateway can embed them in
//! plain-text responses.

use thiserror::Error;

/// Failure of the one outbound call to the provider. Never retried.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection, DNS, TLS or timeout failure before a response arrived.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    /// Provider answered with a non-success status. `body` is the raw response text.
    #[error("upstream API error ({status}): {body}")]
    Api { status: u16, body: String },
    /// Response arrived but did not match the expected envelope.
    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

impl UpstreamError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, UpstreamError::Malformed(_))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config: {0}")]
    Load(#[from] config::ConfigError),
    #[error("no API key configured (set CLAUDE_API_KEY or ANTHROPIC_API_KEY)")]
    MissingApiKey,
    /// TLS backend or resolver could not be initialised for the upstream client.
    #[error("http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
