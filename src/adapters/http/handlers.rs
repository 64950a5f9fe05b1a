//! HTTP handlers for the API endpoints.
//!
//! Handlers connect axum routes to the application services. Service
//! failures map onto the `{success: false, error}` surface with HTTP 200;
//! the caller's form state is never mutated by a failed turn.

use std::sync::Arc;

use axum::extract::{Json, State};

use crate::application::{ChatService, FeedbackService, SummaryService, SurveyService};
use crate::domain::feedback::Message;

use super::dto::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessageDto, FeedbackChatRequest,
    FeedbackChatResponse, HealthResponse, SummaryRequest, SummaryResponse, SurveyOpeningRequest,
    SurveyOpeningResponse, SurveyScoreRequest, SurveyScoreResponse,
};

/// Shared application state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub feedback: Arc<FeedbackService>,
    pub chat: Arc<ChatService>,
    pub summary: Arc<SummaryService>,
    pub survey: Arc<SurveyService>,
}

impl AppState {
    /// Creates a new AppState.
    pub fn new(
        feedback: Arc<FeedbackService>,
        chat: Arc<ChatService>,
        summary: Arc<SummaryService>,
        survey: Arc<SurveyService>,
    ) -> Self {
        Self {
            feedback,
            chat,
            summary,
            survey,
        }
    }
}

fn to_domain_messages(messages: Vec<ChatMessageDto>) -> Vec<Message> {
    messages.into_iter().map(Into::into).collect()
}

/// GET /health - liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /api/feedback/chat - one feedback conversation turn.
///
/// Runs the extraction engine over the submitted history and prior form.
/// The response always carries the form the caller must send next turn.
pub async fn feedback_chat(
    State(state): State<AppState>,
    Json(request): Json<FeedbackChatRequest>,
) -> Json<FeedbackChatResponse> {
    let messages = to_domain_messages(request.messages);
    let prior_form = request.form.map(Into::into);

    match state
        .feedback
        .invoke(&request.contact, &messages, prior_form)
        .await
    {
        Ok(turn) => Json(FeedbackChatResponse::ok(turn)),
        Err(err) => {
            tracing::warn!(error = %err, "feedback turn failed");
            Json(FeedbackChatResponse::failure(err.to_string()))
        }
    }
}

/// POST /api/chat - plain chat completion with an optional schema.
pub async fn chat_completion(
    State(state): State<AppState>,
    Json(request): Json<ChatCompletionRequest>,
) -> Json<ChatCompletionResponse> {
    let messages = to_domain_messages(request.messages);

    match state.chat.invoke(&messages, request.schema.as_ref()).await {
        Ok(reply) => Json(ChatCompletionResponse::ok(reply)),
        Err(err) => {
            tracing::warn!(error = %err, "chat completion failed");
            Json(ChatCompletionResponse::failure(err.to_string()))
        }
    }
}

/// POST /api/summaries - summarize a list of notes.
pub async fn summarize(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> Json<SummaryResponse> {
    match state.summary.summarize(&request.notes).await {
        Ok(summary) => Json(SummaryResponse::ok(summary)),
        Err(err) => {
            tracing::warn!(error = %err, "summarization failed");
            Json(SummaryResponse::failure(err.to_string()))
        }
    }
}

/// POST /api/surveys/opening - generate a survey opening message.
pub async fn survey_opening(
    State(state): State<AppState>,
    Json(request): Json<SurveyOpeningRequest>,
) -> Json<SurveyOpeningResponse> {
    match state.survey.opening_message(&request.contact).await {
        Ok(message) => Json(SurveyOpeningResponse::ok(message)),
        Err(err) => {
            tracing::warn!(error = %err, "survey opening failed");
            Json(SurveyOpeningResponse::failure(err.to_string()))
        }
    }
}

/// POST /api/surveys/score - score a survey conversation.
pub async fn survey_score(
    State(state): State<AppState>,
    Json(request): Json<SurveyScoreRequest>,
) -> Json<SurveyScoreResponse> {
    let messages = to_domain_messages(request.messages);

    match state
        .survey
        .score_conversation(&request.contact, &messages)
        .await
    {
        Ok(health) => Json(SurveyScoreResponse::ok(health)),
        Err(err) => {
            tracing::warn!(error = %err, "survey scoring failed");
            Json(SurveyScoreResponse::failure(err.to_string()))
        }
    }
}
