//! Dialogue orchestrator for civic feedback intake.
//!
//! Given the caller's conversation history and the previously extracted
//! partial form, one [`FeedbackService::invoke`] call produces the reply
//! text, the updated form and the authoritative completion flag. The
//! service owns no conversation state; the caller carries the form between
//! turns.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::contract::{decode_extraction, EXTRACTION_SCHEMA};
use crate::domain::feedback::{ExtractionPolicy, FeedbackForm, Message};
use crate::ports::{ChatModel, Geocoder, ModelError, ModelReply, OpinionStore};

use super::commit::CommitPipeline;

/// Outcome of one successful feedback turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackTurn {
    /// Conversational reply to surface to the resident.
    pub answer: String,
    /// The merged form the caller must carry into the next turn.
    pub form: FeedbackForm,
    /// Authoritative completion flag, recomputed from the merged form.
    pub form_complete: bool,
}

/// Failures that surface to the caller as an unsuccessful turn.
///
/// Neither variant mutates the caller's form, so retrying with the same
/// prior form is always safe. Contract violations are not here: they are
/// recovered inside the turn.
#[derive(Debug, Error)]
pub enum TurnError {
    /// No messages were supplied; nothing was sent to the gateway.
    #[error("conversation is empty")]
    EmptyConversation,

    /// The model gateway failed or was unreachable.
    #[error("model gateway error: {0}")]
    Gateway(#[from] ModelError),
}

/// The conversational extraction/merge/completion engine.
pub struct FeedbackService {
    model: Arc<dyn ChatModel>,
    commit: CommitPipeline,
    policy: ExtractionPolicy,
}

impl FeedbackService {
    /// Creates a new service over the given gateways.
    pub fn new(
        model: Arc<dyn ChatModel>,
        geocoder: Arc<dyn Geocoder>,
        store: Arc<dyn OpinionStore>,
        policy: ExtractionPolicy,
    ) -> Self {
        Self {
            model,
            commit: CommitPipeline::new(geocoder, store),
            policy,
        }
    }

    /// Runs one extraction turn.
    ///
    /// Builds the augmented context (policy + prior form rendering +
    /// history), calls the gateway under the extraction schema, merges the
    /// returned patch and recomputes completion. A reply that violates the
    /// contract is recovered locally: the prior form is kept and the raw
    /// reply text becomes the answer. When the merge completes the form,
    /// the commit pipeline runs before returning; its failures never change
    /// the turn outcome.
    pub async fn invoke(
        &self,
        contact: &str,
        history: &[Message],
        prior_form: Option<FeedbackForm>,
    ) -> Result<FeedbackTurn, TurnError> {
        if history.is_empty() {
            return Err(TurnError::EmptyConversation);
        }

        let prior = prior_form.unwrap_or_default();
        let prior_complete = prior.is_complete();

        let context = self.build_context(&prior, history);
        let reply = self.model.chat(&context, Some(&EXTRACTION_SCHEMA)).await?;

        let (answer, form, form_complete) = match reply {
            ModelReply::Structured(value) => match decode_extraction(&value) {
                Ok(extraction) => {
                    let merged = prior.merge(&extraction.form);
                    let complete = merged.is_complete();
                    if extraction.form_complete != complete {
                        tracing::debug!(
                            advisory = extraction.form_complete,
                            authoritative = complete,
                            "gateway completion claim differs from merged form"
                        );
                    }
                    (extraction.answer, merged, complete)
                }
                Err(violation) => {
                    tracing::warn!(
                        reason = %violation.reason,
                        "extraction reply violated the output contract; keeping prior form"
                    );
                    (violation.into_raw(), prior, prior_complete)
                }
            },
            ModelReply::Text(text) => {
                tracing::warn!(
                    "extraction reply arrived as plain text under a schema request; keeping prior form"
                );
                (text, prior, prior_complete)
            }
        };

        // Commit fires only on the incomplete-to-complete transition, so a
        // conversation that keeps going after submission does not create a
        // new record every turn.
        if form_complete && !prior_complete {
            self.commit.run(contact, &form).await;
        }

        Ok(FeedbackTurn {
            answer,
            form,
            form_complete,
        })
    }

    fn build_context(&self, prior: &FeedbackForm, history: &[Message]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(format!(
            "{}\n\n{}",
            self.policy.as_str(),
            render_form_state(prior)
        )));
        messages.extend_from_slice(history);
        messages
    }
}

fn render_form_state(form: &FeedbackForm) -> String {
    fn line(name: &str, value: Option<&str>) -> String {
        match value {
            Some(v) => format!("- {}: {}", name, v),
            None => format!("- {}: (not yet provided)", name),
        }
    }

    [
        "Form fields collected so far:".to_string(),
        line("title", form.title.as_deref()),
        line("category", form.category.map(|c| c.as_str())),
        line("description", form.description.as_deref()),
        line("place", form.place.as_deref()),
    ]
    .join("\n")
}
