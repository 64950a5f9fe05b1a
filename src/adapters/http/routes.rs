//! Router setup for all API routes.

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers::{
    chat_completion, feedback_chat, health, summarize, survey_opening, survey_score, AppState,
};

/// Creates the API routes.
///
/// - POST /api/feedback/chat - feedback intake turn
/// - POST /api/chat - plain chat completion
/// - POST /api/summaries - note-list summarization
/// - POST /api/surveys/opening - survey opening message
/// - POST /api/surveys/score - survey conversation scoring
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/feedback/chat", post(feedback_chat))
        .route("/chat", post(chat_completion))
        .route("/summaries", post(summarize))
        .route("/surveys/opening", post(survey_opening))
        .route("/surveys/score", post(survey_score))
}

/// Combined router with the health probe and all API routes under /api.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
