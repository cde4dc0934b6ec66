//! Conversation turns and the role filter applied before anything goes upstream.

use serde::{Deserialize, Deserializer, Serialize};

/// Role of a turn. Client input is untrusted, so anything that is not exactly
/// `user` or `assistant` lands in `Other` and is never forwarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Assistant,
    Other(String),
}

impl Role {
    pub fn from_wire(s: &str) -> Self {
        match s {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            other => Role::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Other(s) => s.as_str(),
        }
    }

    /// Only these two roles are accepted by the provider's `messages` array.
    pub fn is_forwarded(&self) -> bool {
        matches!(self, Role::User | Role::Assistant)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Other(String::new())
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Role::from_wire(&s)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: Role,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

pub type ConversationHistory = Vec<ConversationTurn>;

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Keep `user`/`assistant` turns in their original order; drop the rest silently.
pub fn normalize(turns: ConversationHistory) -> ConversationHistory {
    let before = turns.len();
    let kept: ConversationHistory = turns
        .into_iter()
        .filter(|t| t.role.is_forwarded())
        .collect();
    if kept.len() != before {
        tracing::debug!(
            dropped = before - kept.len(),
            "normalize: dropped turns with unsupported roles"
        );
    }
    kept
}
