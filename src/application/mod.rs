//! Application layer - orchestration services over the ports.

mod chat_service;
mod commit;
mod feedback_service;
mod summary_service;
mod survey_service;

pub use chat_service::ChatService;
pub use commit::CommitPipeline;
pub use feedback_service::{FeedbackService, FeedbackTurn, TurnError};
pub use summary_service::{NotesSummary, SummaryError, SummaryService};
pub use survey_service::{SurveyError, SurveyService};
