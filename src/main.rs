//! Civic Scribe server binary.
//!
//! Loads configuration, wires the adapters into the application services
//! and serves the HTTP API.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::EnvFilter;

use civic_scribe::adapters::ai::{
    AnthropicChatModel, AnthropicConfig, OpenAiChatModel, OpenAiConfig,
};
use civic_scribe::adapters::geocoding::{NominatimConfig, NominatimGeocoder};
use civic_scribe::adapters::http::{app_router, AppState};
use civic_scribe::adapters::store::{PostgresOpinionStore, PostgresSurveyStore};
use civic_scribe::application::{ChatService, FeedbackService, SummaryService, SurveyService};
use civic_scribe::config::{AppConfig, ModelProvider, ServerConfig};
use civic_scribe::ports::ChatModel;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.log_level))
        .init();

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database migrations applied");
    }

    let model = build_model(&config);
    let geocoder = Arc::new(NominatimGeocoder::new(
        NominatimConfig::default()
            .with_base_url(config.geocoding.base_url.clone())
            .with_user_agent(config.geocoding.user_agent.clone())
            .with_timeout(config.geocoding.timeout()),
    ));
    let opinion_store = Arc::new(PostgresOpinionStore::new(pool.clone()));
    let survey_store = Arc::new(PostgresSurveyStore::new(pool));

    let policy = config.ai.extraction_policy()?;
    let state = AppState::new(
        Arc::new(FeedbackService::new(
            model.clone(),
            geocoder,
            opinion_store,
            policy,
        )),
        Arc::new(ChatService::new(model.clone())),
        Arc::new(SummaryService::new(model.clone())),
        Arc::new(SurveyService::new(model, survey_store)),
    );

    let app = app_router(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors_layer(&config.server));

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "civic-scribe listening");
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_model(config: &AppConfig) -> Arc<dyn ChatModel> {
    match config.ai.provider {
        ModelProvider::Anthropic => {
            let key = config
                .ai
                .anthropic_api_key
                .clone()
                .expect("validated: Anthropic API key present");
            let mut provider_config = AnthropicConfig::new(key)
                .with_timeout(config.ai.timeout())
                .with_max_retries(config.ai.max_retries);
            if let Some(model) = &config.ai.model {
                provider_config = provider_config.with_model(model.clone());
            }
            Arc::new(AnthropicChatModel::new(provider_config))
        }
        ModelProvider::OpenAi => {
            let key = config
                .ai
                .openai_api_key
                .clone()
                .expect("validated: OpenAI API key present");
            let mut provider_config = OpenAiConfig::new(key)
                .with_timeout(config.ai.timeout())
                .with_max_retries(config.ai.max_retries);
            if let Some(model) = &config.ai.model {
                provider_config = provider_config.with_model(model.clone());
            }
            Arc::new(OpenAiChatModel::new(provider_config))
        }
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
