//! Note-list summarization.

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::domain::feedback::Message;
use crate::ports::{ChatModel, ModelError, ModelReply};

static SUMMARY_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "summary": {
                "type": "object",
                "properties": {
                    "goodPoint": {
                        "type": "string",
                        "description": "Summary of what is going well"
                    },
                    "badPoint": {
                        "type": "string",
                        "description": "Summary of what is going badly"
                    }
                },
                "required": ["goodPoint", "badPoint"]
            }
        },
        "required": ["summary"]
    })
});

/// Good/bad points distilled from a list of notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesSummary {
    pub good_point: String,
    pub bad_point: String,
}

/// Summarization failures.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// The model gateway failed or was unreachable.
    #[error("model gateway error: {0}")]
    Gateway(#[from] ModelError),

    /// The gateway reply did not carry the expected summary shape.
    #[error("model returned an unusable reply: {0}")]
    MalformedReply(String),
}

/// Distills a list of free-form notes into good and bad points.
pub struct SummaryService {
    model: Arc<dyn ChatModel>,
}

impl SummaryService {
    /// Creates a new service over the given gateway.
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Summarizes the notes into good and bad points.
    pub async fn summarize(&self, notes: &[String]) -> Result<NotesSummary, SummaryError> {
        let prompt = build_prompt(notes);
        let reply = self
            .model
            .chat(&[Message::user(prompt)], Some(&SUMMARY_SCHEMA))
            .await?;

        match reply {
            ModelReply::Structured(value) => value
                .get("summary")
                .cloned()
                .and_then(|summary| serde_json::from_value::<NotesSummary>(summary).ok())
                .ok_or_else(|| SummaryError::MalformedReply(value.to_string())),
            ModelReply::Text(text) => Err(SummaryError::MalformedReply(text)),
        }
    }
}

fn build_prompt(notes: &[String]) -> String {
    let listed = notes
        .iter()
        .map(|note| format!("- {}", note))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are skilled at distilling key points from a set of texts.\n\
         Summarize the notes below into the good points and the bad points,\n\
         including any overall tendencies you observe in each. Write in a\n\
         polite register and keep each summary to roughly 200 characters.\n\n\
         --- Notes ---\n{}\n-------------",
        listed
    )
}
