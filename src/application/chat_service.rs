//! Plain chat pass-through.
//!
//! Forwards a conversation to the model gateway, optionally under a
//! caller-supplied JSON schema, with no multi-turn state of its own.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::feedback::Message;
use crate::ports::{ChatModel, ModelReply};

use super::feedback_service::TurnError;

/// One-shot chat completion service.
pub struct ChatService {
    model: Arc<dyn ChatModel>,
}

impl ChatService {
    /// Creates a new service over the given gateway.
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Generates a reply for the conversation.
    ///
    /// With `schema`, the gateway constrains its output to the schema and
    /// the reply is structured JSON; without it the reply is plain text.
    pub async fn invoke(
        &self,
        messages: &[Message],
        schema: Option<&Value>,
    ) -> Result<ModelReply, TurnError> {
        if messages.is_empty() {
            return Err(TurnError::EmptyConversation);
        }
        Ok(self.model.chat(messages, schema).await?)
    }
}
