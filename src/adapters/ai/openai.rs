//! OpenAI adapter - ChatModel implementation for OpenAI's chat API.
//!
//! Structured mode uses the `json_schema` response format, so the model's
//! output is constrained server-side to the caller's schema. The reply
//! content is then decoded from the message text.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAiConfig::new(api_key)
//!     .with_model("gpt-4o-mini")
//!     .with_base_url("https://api.openai.com/v1");
//!
//! let model = OpenAiChatModel::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::feedback::{Message, MessageRole};
use crate::ports::{ChatModel, ModelError, ModelReply};

/// Configuration for the OpenAI adapter.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use.
    pub model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl OpenAiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 3,
            temperature: 0.7,
            max_tokens: 1024,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI ChatModel implementation.
pub struct OpenAiChatModel {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiChatModel {
    /// Creates a new adapter with the given configuration.
    pub fn new(config: OpenAiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Converts our messages to OpenAI's format.
    fn to_openai_request(&self, messages: &[Message], schema: Option<&Value>) -> OpenAiRequest {
        let messages = messages
            .iter()
            .map(|msg| OpenAiMessage {
                role: match msg.role {
                    MessageRole::System => "system",
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                }
                .to_string(),
                content: msg.content.clone(),
            })
            .collect();

        OpenAiRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            response_format: schema.map(|schema| {
                serde_json::json!({
                    "type": "json_schema",
                    "json_schema": {
                        "name": "reply",
                        "strict": true,
                        "schema": schema
                    }
                })
            }),
        }
    }

    /// Sends a request and maps transport failures.
    async fn send_request(
        &self,
        messages: &[Message],
        schema: Option<&Value>,
    ) -> Result<Response, ModelError> {
        let request = self.to_openai_request(messages, schema);

        self.client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    ModelError::network(format!("Connection failed: {}", e))
                } else {
                    ModelError::network(e.to_string())
                }
            })
    }

    /// Maps the response status onto the error taxonomy.
    async fn handle_response_status(&self, response: Response) -> Result<Response, ModelError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 => Err(ModelError::AuthenticationFailed),
            429 => Err(ModelError::rate_limited(30)),
            400 => {
                if error_body.contains("maximum context length") {
                    Err(ModelError::ContextTooLong)
                } else {
                    Err(ModelError::InvalidRequest(error_body))
                }
            }
            500..=599 => Err(ModelError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(ModelError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Parses a response body into a reply.
    async fn parse_response(
        &self,
        response: Response,
        structured: bool,
    ) -> Result<ModelReply, ModelError> {
        let response = self.handle_response_status(response).await?;

        let body: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| ModelError::parse(format!("Failed to parse response: {}", e)))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ModelError::parse("response contains no choices"))?;

        Ok(decode_content(content, structured))
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn chat(
        &self,
        messages: &[Message],
        schema: Option<&Value>,
    ) -> Result<ModelReply, ModelError> {
        let mut last_error = ModelError::network("No attempts made");
        let mut retry_count = 0;

        while retry_count <= self.config.max_retries {
            match self.send_request(messages, schema).await {
                Ok(response) => match self.parse_response(response, schema.is_some()).await {
                    Ok(reply) => return Ok(reply),
                    Err(err) => {
                        if !err.is_retryable() || retry_count >= self.config.max_retries {
                            return Err(err);
                        }
                        last_error = err;
                    }
                },
                Err(err) => {
                    if !err.is_retryable() || retry_count >= self.config.max_retries {
                        return Err(err);
                    }
                    last_error = err;
                }
            }

            // Exponential backoff: 1s, 2s, 4s, ...
            let delay = Duration::from_secs(1 << retry_count);
            sleep(delay).await;
            retry_count += 1;
        }

        Err(last_error)
    }
}

/// Under a schema request the content should be JSON; content that fails to
/// decode is surfaced as text so callers can apply contract recovery.
fn decode_content(content: String, structured: bool) -> ModelReply {
    if structured {
        if let Ok(value) = serde_json::from_str::<Value>(&content) {
            return ModelReply::Structured(value);
        }
    }
    ModelReply::Text(content)
}

// ----- OpenAI API types -----

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}
