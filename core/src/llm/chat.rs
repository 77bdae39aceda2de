//! Chat message types for LLM communication

use serde::{Deserialize, Serialize};

/// Role of the message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message (instructions for the model)
    System,
    /// User message
    User,
    /// Assistant message (model response)
    Assistant,
}

/// A single message in a conversation.
///
/// `id` is the opaque identifier the backend assigned to an assistant reply;
/// it is `None` for user messages and for backends that are stateless per
/// call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
    /// Backend-assigned identifier, where the backend supports continuity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ChatMessage {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: MessageRole::User,
            content: content.into(),
            id: None,
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: MessageRole::System,
            content: content.into(),
            id: None,
        }
    }

    /// Create a new assistant message with its backend identifier
    pub fn assistant(content: impl Into<String>, id: impl Into<String>) -> Self {
        let id = id.into();
        ChatMessage {
            role: MessageRole::Assistant,
            content: content.into(),
            id: if id.is_empty() { None } else { Some(id) },
        }
    }
}
