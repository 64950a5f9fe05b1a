//! Mock chat model for testing.
//!
//! Queue-driven test double for the ChatModel port: tests enqueue replies
//! or errors and inspect the recorded calls afterwards.
//!
//! # Example
//!
//! ```ignore
//! let model = MockChatModel::new()
//!     .with_reply(ModelReply::Text("Hello!".to_string()));
//!
//! let reply = model.chat(&messages, None).await?;
//! assert_eq!(model.call_count(), 1);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::feedback::Message;
use crate::ports::{ChatModel, ModelError, ModelReply};

/// Mock chat model. Clones share the reply queue and call history.
#[derive(Debug, Clone, Default)]
pub struct MockChatModel {
    /// Pre-configured replies, consumed in order.
    replies: Arc<Mutex<VecDeque<Result<ModelReply, ModelError>>>>,
    /// Recorded calls: messages plus the schema each call carried.
    calls: Arc<Mutex<Vec<(Vec<Message>, Option<Value>)>>>,
}

impl MockChatModel {
    /// Creates a new mock with an empty reply queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a reply.
    pub fn with_reply(self, reply: ModelReply) -> Self {
        self.replies.lock().unwrap().push_back(Ok(reply));
        self
    }

    /// Enqueues a plain-text reply.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_reply(ModelReply::Text(text.into()))
    }

    /// Enqueues an error.
    pub fn with_error(self, error: ModelError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    /// Number of calls made to this model.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// All recorded calls.
    pub fn calls(&self) -> Vec<(Vec<Message>, Option<Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn chat(
        &self,
        messages: &[Message],
        schema: Option<&Value>,
    ) -> Result<ModelReply, ModelError> {
        self.calls
            .lock()
            .unwrap()
            .push((messages.to_vec(), schema.cloned()));

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ModelReply::Text("Mock reply".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn replies_are_consumed_in_order() {
        let model = MockChatModel::new()
            .with_text("first")
            .with_reply(ModelReply::Structured(json!({"n": 2})));

        let first = model.chat(&[Message::user("a")], None).await.unwrap();
        let second = model.chat(&[Message::user("b")], None).await.unwrap();

        assert_eq!(first, ModelReply::Text("first".to_string()));
        assert_eq!(second, ModelReply::Structured(json!({"n": 2})));
    }

    #[tokio::test]
    async fn empty_queue_yields_a_default_reply() {
        let model = MockChatModel::new();
        let reply = model.chat(&[Message::user("a")], None).await.unwrap();
        assert_eq!(reply, ModelReply::Text("Mock reply".to_string()));
    }

    #[tokio::test]
    async fn errors_are_returned_in_order() {
        let model = MockChatModel::new().with_error(ModelError::unavailable("down"));
        let err = model.chat(&[Message::user("a")], None).await.unwrap_err();
        assert!(matches!(err, ModelError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn records_messages_and_schema() {
        let model = MockChatModel::new().with_text("ok");
        let schema = json!({"type": "object"});
        model
            .chat(&[Message::user("hello")], Some(&schema))
            .await
            .unwrap();

        assert_eq!(model.call_count(), 1);
        let (messages, sent_schema) = model.calls().remove(0);
        assert_eq!(messages, vec![Message::user("hello")]);
        assert_eq!(sent_schema, Some(schema));
    }
}
