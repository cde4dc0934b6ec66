//! Process-wide proxy configuration, loaded once at startup.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | CLAUDE_API_KEY / ANTHROPIC_API_KEY | none | Provider key. First non-empty wins; never read from file. |
//! | PORT / POCHI__PORT | 8080 | Listening port. `PORT` wins (hosting platforms set it). |
//! | POCHI__HOST | 0.0.0.0 | Bind address. |
//! | POCHI__PERSONA_DIR | ./context | Directory holding persona fragments. |
//! | POCHI__PERSONA_FALLBACK_DIR | ../../.openclaw/workspace | Used when the primary dir is absent. |
//! | POCHI__SYSTEM_PROMPT | Pochi preamble | Base system prompt; persona fragments are appended. |
//! | POCHI__MODEL | claude-3-haiku-20240307 | Provider model id. |
//! | POCHI__MAX_TOKENS | 1024 | `max_tokens` sent upstream. |
//! | POCHI__API_BASE | https://api.anthropic.com | Provider base URL. |
//! | POCHI__UPSTREAM_TIMEOUT_SECS | 30 | Upstream call timeout, clamped to 10..=60. |
//!
//! An optional TOML file (`POCHI_CONFIG`, default `config/pochi.toml`) sits
//! between the defaults and the environment.

use crate::error::ConfigError;
use crate::persona::DEFAULT_FRAGMENTS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Pochi (ぽち) 🧸. Your personality context is loaded below. \
Keep responses warm, helpful, and concise.";

const API_KEY_VARS: [&str; 2] = ["CLAUDE_API_KEY", "ANTHROPIC_API_KEY"];
const MIN_TIMEOUT_SECS: u64 = 10;
const MAX_TIMEOUT_SECS: u64 = 60;

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_persona_dir() -> PathBuf {
    PathBuf::from("./context")
}

fn default_persona_fallback_dir() -> Option<PathBuf> {
    Some(PathBuf::from("../../.openclaw/workspace"))
}

fn default_fragments() -> Vec<String> {
    DEFAULT_FRAGMENTS.iter().map(|s| s.to_string()).collect()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Immutable for the process lifetime; shared behind an `Arc`.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_persona_dir")]
    pub persona_dir: PathBuf,
    #[serde(default = "default_persona_fallback_dir")]
    pub persona_fallback_dir: Option<PathBuf>,
    /// Fragment file names, in prompt order.
    #[serde(default = "default_fragments")]
    pub persona_fragments: Vec<String>,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_timeout_secs")]
    pub upstream_timeout_secs: u64,
    /// Populated from the environment only.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            persona_dir: default_persona_dir(),
            persona_fallback_dir: default_persona_fallback_dir(),
            persona_fragments: default_fragments(),
            system_prompt: default_system_prompt(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            api_base: default_api_base(),
            upstream_timeout_secs: default_timeout_secs(),
            api_key: None,
        }
    }
}

impl std::fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("persona_dir", &self.persona_dir)
            .field("persona_fallback_dir", &self.persona_fallback_dir)
            .field("persona_fragments", &self.persona_fragments)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("api_base", &self.api_base)
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ProxyConfig {
    /// Load from file and environment. Precedence: env > `POCHI_CONFIG` file > defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("POCHI_CONFIG").unwrap_or_else(|_| "config/pochi".to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Same as [`ProxyConfig::load`] with an explicit file path. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let built = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("POCHI").separator("__"))
            .build()?;

        let mut cfg: ProxyConfig = built.try_deserialize()?;
        if let Some(port) = std::env::var("PORT")
            .ok()
            .and_then(|p| p.trim().parse::<u16>().ok())
        {
            cfg.port = port;
        }
        cfg.api_key = api_key_from(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(
            self.upstream_timeout_secs
                .clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS),
        )
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// First non-empty (after trim) of `CLAUDE_API_KEY`, `ANTHROPIC_API_KEY`.
pub fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|name| lookup(*name))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}
