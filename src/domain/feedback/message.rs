//! Chat messages exchanged between a resident and the assistant.

use serde::{Deserialize, Serialize};

/// A single message in a conversation.
///
/// Produced by the caller (user turns) or by the orchestrator when it
/// reconstructs context (system/assistant turns); never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message.
    pub role: MessageRole,
    /// Message content.
    pub content: String,
}

impl Message {
    /// Creates a new message.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Returns true if this message came from the resident.
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

/// Role of the message sender.
///
/// Callers submit `user` and `assistant` turns; `system` is reserved for
/// context the orchestrator prepends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions (guides model behavior).
    System,
    /// Resident input.
    User,
    /// Assistant (model) response.
    Assistant,
}

/// Renders a conversation as plain transcript text for one-shot prompts.
pub fn render_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| {
            let speaker = match m.role {
                MessageRole::System => "System",
                MessageRole::User => "Resident",
                MessageRole::Assistant => "Assistant",
            };
            format!("{}: {}", speaker, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
