//! Wellbeing survey conversations.
//!
//! Two one-shot operations over the model gateway: generating a
//! health-aware opening message for a survey conversation, and scoring a
//! finished conversation into a persisted [`HealthAssessment`].

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::domain::feedback::{render_transcript, Message};
use crate::domain::survey::{HealthAssessment, InvalidHealthScore};
use crate::ports::{ChatModel, ModelError, ModelReply, StoreError, SurveyStore};

static HEALTH_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "health": {
                "type": "object",
                "properties": {
                    "score": {
                        "type": "integer",
                        "description": "Wellbeing score from 1 to 100"
                    },
                    "note": {
                        "type": "string",
                        "description": "Reasoning behind the score"
                    }
                },
                "required": ["score", "note"]
            }
        },
        "required": ["health"]
    })
});

/// Survey operation failures.
#[derive(Debug, Error)]
pub enum SurveyError {
    /// No messages were supplied for scoring.
    #[error("conversation is empty")]
    EmptyConversation,

    /// The contact has no recorded health assessment to open from.
    #[error("no health assessment on record for {0}")]
    NoHealthRecord(String),

    /// The model gateway failed or was unreachable.
    #[error("model gateway error: {0}")]
    Gateway(#[from] ModelError),

    /// The survey store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The gateway reply did not carry the expected shape.
    #[error("model returned an unusable reply: {0}")]
    MalformedReply(String),

    /// The gateway reported a score outside the valid range.
    #[error(transparent)]
    InvalidScore(#[from] InvalidHealthScore),
}

/// Survey conversation service.
pub struct SurveyService {
    model: Arc<dyn ChatModel>,
    store: Arc<dyn SurveyStore>,
}

#[derive(Deserialize)]
struct RawHealth {
    score: i32,
    note: String,
}

impl SurveyService {
    /// Creates a new service over the given gateways.
    pub fn new(model: Arc<dyn ChatModel>, store: Arc<dyn SurveyStore>) -> Self {
        Self { model, store }
    }

    /// Generates an opening message for a survey conversation, grounded in
    /// the contact's most recent health assessment.
    pub async fn opening_message(&self, contact: &str) -> Result<String, SurveyError> {
        let health = self
            .store
            .latest_health(contact)
            .await?
            .ok_or_else(|| SurveyError::NoHealthRecord(contact.to_string()))?;

        let prompt = opening_prompt(&health);
        let reply = self.model.chat(&[Message::user(prompt)], None).await?;

        match reply {
            ModelReply::Text(text) => Ok(text.trim().to_string()),
            ModelReply::Structured(value) => Err(SurveyError::MalformedReply(value.to_string())),
        }
    }

    /// Scores a finished survey conversation and records the assessment
    /// for the contact.
    pub async fn score_conversation(
        &self,
        contact: &str,
        history: &[Message],
    ) -> Result<HealthAssessment, SurveyError> {
        if history.is_empty() {
            return Err(SurveyError::EmptyConversation);
        }

        let prompt = scoring_prompt(history);
        let reply = self
            .model
            .chat(&[Message::user(prompt)], Some(&HEALTH_SCHEMA))
            .await?;

        let value = match reply {
            ModelReply::Structured(value) => value,
            ModelReply::Text(text) => return Err(SurveyError::MalformedReply(text)),
        };

        let raw: RawHealth = value
            .get("health")
            .cloned()
            .and_then(|health| serde_json::from_value(health).ok())
            .ok_or_else(|| SurveyError::MalformedReply(value.to_string()))?;

        let health = HealthAssessment::new(raw.score, raw.note)?;
        self.store.record_health(contact, &health).await?;
        Ok(health)
    }
}

fn opening_prompt(health: &HealthAssessment) -> String {
    format!(
        "You are an experienced counsellor opening a one-on-one check-in\n\
         over chat. Use the latest wellbeing data below to open the\n\
         conversation warmly and naturally.\n\n\
         --- Latest wellbeing data ---\n\
         Score: {} out of 100\n\
         Note: {}\n\
         -----------------------------\n\n\
         Rules:\n\
         - The score is context for you; never mention the number itself.\n\
         - You are a chat bot: never comment on appearance or tone of voice,\n\
           only on what was written.",
        health.score, health.note
    )
}

fn scoring_prompt(history: &[Message]) -> String {
    format!(
        "You are an expert at reading conversations. Read the transcript\n\
         below, rate the overall positivity as a wellbeing score from 1 to\n\
         100, and give a short note explaining the score.\n\n\
         --- Transcript ---\n{}\n------------------",
        render_transcript(history)
    )
}
