//! HTTP DTOs for the API endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing
//! independent evolution. Responses follow the `{success, ..., error}`
//! surface: orchestrator failures come back as `success: false` with a
//! message rather than as HTTP errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::{FeedbackTurn, NotesSummary};
use crate::domain::feedback::{Category, FeedbackForm, Message, MessageRole};
use crate::domain::survey::HealthAssessment;
use crate::ports::ModelReply;

// ════════════════════════════════════════════════════════════════════════════════
// Shared DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// A chat message submitted by a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageDto {
    pub role: MessageRoleDto,
    pub content: String,
}

/// Role of a submitted message. Callers only speak as the resident or
/// relay the assistant's earlier turns; system is not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRoleDto {
    User,
    Assistant,
}

impl From<ChatMessageDto> for Message {
    fn from(dto: ChatMessageDto) -> Self {
        let role = match dto.role {
            MessageRoleDto::User => MessageRole::User,
            MessageRoleDto::Assistant => MessageRole::Assistant,
        };
        Message::new(role, dto.content)
    }
}

/// Feedback category on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryDto {
    Request,
    Question,
    Praise,
}

impl From<CategoryDto> for Category {
    fn from(dto: CategoryDto) -> Self {
        match dto {
            CategoryDto::Request => Category::Request,
            CategoryDto::Question => Category::Question,
            CategoryDto::Praise => Category::Praise,
        }
    }
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        match category {
            Category::Request => CategoryDto::Request,
            Category::Question => CategoryDto::Question,
            Category::Praise => CategoryDto::Praise,
        }
    }
}

/// The caller-carried feedback form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormDto {
    pub title: Option<String>,
    pub category: Option<CategoryDto>,
    pub description: Option<String>,
    pub place: Option<String>,
}

impl From<FormDto> for FeedbackForm {
    fn from(dto: FormDto) -> Self {
        FeedbackForm {
            title: dto.title,
            category: dto.category.map(Into::into),
            description: dto.description,
            place: dto.place,
        }
    }
}

impl From<FeedbackForm> for FormDto {
    fn from(form: FeedbackForm) -> Self {
        FormDto {
            title: form.title,
            category: form.category.map(Into::into),
            description: form.description,
            place: form.place,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Feedback intake
// ════════════════════════════════════════════════════════════════════════════════

/// One feedback conversation turn.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackChatRequest {
    /// Contact address of the resident.
    pub contact: String,
    /// Full conversation history, oldest first.
    pub messages: Vec<ChatMessageDto>,
    /// The form as returned by the previous turn, if any.
    #[serde(default)]
    pub form: Option<FormDto>,
}

/// Result of one feedback conversation turn.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackChatResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<FormDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_complete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FeedbackChatResponse {
    /// Builds a success response from a completed turn.
    pub fn ok(turn: FeedbackTurn) -> Self {
        Self {
            success: true,
            answer: Some(turn.answer),
            form: Some(turn.form.into()),
            form_complete: Some(turn.form_complete),
            error: None,
        }
    }

    /// Builds a failure response.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            answer: None,
            form: None,
            form_complete: None,
            error: Some(message.into()),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Plain chat
// ════════════════════════════════════════════════════════════════════════════════

/// A plain chat completion request.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionRequest {
    /// Conversation history, oldest first.
    pub messages: Vec<ChatMessageDto>,
    /// Optional JSON schema constraining the reply.
    #[serde(default)]
    pub schema: Option<Value>,
}

/// A plain chat completion response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatCompletionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_json: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatCompletionResponse {
    /// Builds a success response from a gateway reply.
    pub fn ok(reply: ModelReply) -> Self {
        let (text, json) = match reply {
            ModelReply::Text(text) => (Some(text), None),
            ModelReply::Structured(value) => (None, Some(value)),
        };
        Self {
            success: true,
            generated_text: text,
            generated_json: json,
            error: None,
        }
    }

    /// Builds a failure response.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            generated_text: None,
            generated_json: None,
            error: Some(message.into()),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Summaries
// ════════════════════════════════════════════════════════════════════════════════

/// A note-list summarization request.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryRequest {
    pub notes: Vec<String>,
}

/// Good/bad point summary on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDto {
    pub good_point: String,
    pub bad_point: String,
}

impl From<NotesSummary> for SummaryDto {
    fn from(summary: NotesSummary) -> Self {
        Self {
            good_point: summary.good_point,
            bad_point: summary.bad_point,
        }
    }
}

/// A note-list summarization response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SummaryResponse {
    /// Builds a success response.
    pub fn ok(summary: NotesSummary) -> Self {
        Self {
            success: true,
            summary: Some(summary.into()),
            error: None,
        }
    }

    /// Builds a failure response.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            summary: None,
            error: Some(message.into()),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Surveys
// ════════════════════════════════════════════════════════════════════════════════

/// Request for a survey opening message.
#[derive(Debug, Clone, Deserialize)]
pub struct SurveyOpeningRequest {
    pub contact: String,
}

/// Survey opening message response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyOpeningResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SurveyOpeningResponse {
    /// Builds a success response.
    pub fn ok(message: String) -> Self {
        Self {
            success: true,
            opening_message: Some(message),
            error: None,
        }
    }

    /// Builds a failure response.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            opening_message: None,
            error: Some(message.into()),
        }
    }
}

/// Request to score a survey conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct SurveyScoreRequest {
    pub contact: String,
    pub messages: Vec<ChatMessageDto>,
}

/// A health assessment on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct HealthDto {
    pub score: i32,
    pub note: String,
}

impl From<HealthAssessment> for HealthDto {
    fn from(health: HealthAssessment) -> Self {
        Self {
            score: health.score,
            note: health.note,
        }
    }
}

/// Survey scoring response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyScoreResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SurveyScoreResponse {
    /// Builds a success response.
    pub fn ok(health: HealthAssessment) -> Self {
        Self {
            success: true,
            health: Some(health.into()),
            error: None,
        }
    }

    /// Builds a failure response.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            health: None,
            error: Some(message.into()),
        }
    }
}
