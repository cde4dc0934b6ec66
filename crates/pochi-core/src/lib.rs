//! Pochi core library.
//! Turns inbound chat payloads into one Anthropic Messages call with a persona-backed system prompt.

pub mod adapters;
pub mod anthropic_bridge;
pub mod config;
pub mod conversation;
pub mod error;
pub mod persona;
pub mod pipeline;

pub use adapters::{ChatResponse, IntoHistory, LegacyChatRequest, WebChatRequest};
pub use anthropic_bridge::{AnthropicBridge, ChatCompletion, ANTHROPIC_VERSION};
pub use config::ProxyConfig;
pub use conversation::{normalize, ConversationHistory, ConversationTurn, Role};
pub use error::{ConfigError, UpstreamError};
pub use persona::{PersonaLoader, DEFAULT_FRAGMENTS};
pub use pipeline::ChatPipeline;

/// Crate version, shown in the gateway banner and startup log.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
