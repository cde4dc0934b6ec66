//! Inbound request shapes. Each one turns into a [`ConversationHistory`];
//! from there both go through the same completion path.

use crate::conversation::{null_as_default, ConversationHistory, ConversationTurn};
use serde::{Deserialize, Serialize};

pub trait IntoHistory {
    fn into_history(self) -> ConversationHistory;
}

/// `POST /api/chat`: full ordered turn list from the web client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebChatRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<ConversationTurn>,
}

impl IntoHistory for WebChatRequest {
    /// Passed through as-is; role filtering happens in the shared path.
    fn into_history(self) -> ConversationHistory {
        self.messages
    }
}

/// `POST /api/v1/chat`: single message from the wearable client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyChatRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    /// Accepted for wire compatibility; has no effect.
    #[serde(default)]
    pub session: Option<String>,
}

impl IntoHistory for LegacyChatRequest {
    fn into_history(self) -> ConversationHistory {
        vec![ConversationTurn::user(self.message)]
    }
}

/// Outbound envelope for both endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}
