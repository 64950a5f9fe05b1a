//! Model gateway port.
//!
//! Abstracts the LLM backends (Anthropic, OpenAI, mocks) behind a single
//! chat capability with an optional structured-output mode.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::feedback::Message;

/// Port for language-model interactions.
///
/// Implementations connect to external model services and translate
/// between the provider-specific API and our domain types.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generates a reply for the given conversation.
    ///
    /// With `schema`, the gateway is asked to constrain its output to the
    /// supplied JSON schema and a [`ModelReply::Structured`] value is
    /// expected; without it the reply is plain text. A gateway that cannot
    /// honor the schema may still return text - callers decode and recover.
    async fn chat(
        &self,
        messages: &[Message],
        schema: Option<&Value>,
    ) -> Result<ModelReply, ModelError>;
}

/// Reply from the model gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// Plain conversational text.
    Text(String),
    /// A JSON value produced under a caller-supplied schema.
    Structured(Value),
}

impl ModelReply {
    /// Text rendering of the reply, used when surfacing raw content.
    pub fn raw_text(&self) -> String {
        match self {
            ModelReply::Text(text) => text.clone(),
            ModelReply::Structured(value) => value.to_string(),
        }
    }
}

/// Model gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Rate limited by the provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Context (prompt + history) exceeds the model limit.
    #[error("context too long")]
    ContextTooLong,

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during the request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse the provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },
}

impl ModelError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ModelError::RateLimited { .. }
                | ModelError::Unavailable { .. }
                | ModelError::Network(_)
                | ModelError::Timeout { .. }
        )
    }
}
