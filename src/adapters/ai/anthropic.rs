//! Anthropic adapter - ChatModel implementation for Anthropic's Claude API.
//!
//! Plain conversations map straight onto the Messages API. Structured mode
//! is implemented with a forced tool call: the caller's JSON schema becomes
//! the input schema of a single tool the model must use, and the tool input
//! comes back as the structured reply.
//!
//! # Configuration
//!
//! ```ignore
//! let config = AnthropicConfig::new(api_key)
//!     .with_model("claude-3-haiku-20240307")
//!     .with_base_url("https://api.anthropic.com");
//!
//! let model = AnthropicChatModel::new(config);
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

/// Anthropic API version header value.
const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Tool name used to force structured output.
const STRUCTURED_TOOL_NAME: &str = "record_reply";

/// Configuration for the Anthropic adapter.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use.
    pub model: String,
    /// Base URL for the API (default: https://api.anthropic.com).
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

impl AnthropicConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "claude-3-haiku-20240307".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
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

/// Anthropic ChatModel implementation.
pub struct AnthropicChatModel {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicChatModel {
    /// Creates a new adapter with the given configuration.
    pub fn new(config: AnthropicConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Builds the messages endpoint URL.
    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url)
    }

    /// Converts our messages to Anthropic's format.
    ///
    /// Anthropic takes system text as a top-level parameter, so system
    /// messages are collected separately from the turn list.
    fn to_anthropic_request(&self, messages: &[Message], schema: Option<&Value>) -> AnthropicRequest {
        let mut system_parts = Vec::new();
        let mut turns = Vec::new();

        for msg in messages {
            match msg.role {
                MessageRole::System => system_parts.push(msg.content.clone()),
                MessageRole::User => turns.push(AnthropicMessage {
                    role: "user".to_string(),
                    content: msg.content.clone(),
                }),
                MessageRole::Assistant => turns.push(AnthropicMessage {
                    role: "assistant".to_string(),
                    content: msg.content.clone(),
                }),
            }
        }

        let (tools, tool_choice) = match schema {
            Some(schema) => (
                Some(vec![AnthropicTool {
                    name: STRUCTURED_TOOL_NAME.to_string(),
                    description: "Record the reply in the required structure".to_string(),
                    input_schema: schema.clone(),
                }]),
                Some(serde_json::json!({
                    "type": "tool",
                    "name": STRUCTURED_TOOL_NAME
                })),
            ),
            None => (None, None),
        };

        AnthropicRequest {
            model: self.config.model.clone(),
            messages: turns,
            system: if system_parts.is_empty() {
                None
            } else {
                Some(system_parts.join("\n\n"))
            },
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            tools,
            tool_choice,
        }
    }

    /// Sends a request and maps transport failures.
    async fn send_request(
        &self,
        messages: &[Message],
        schema: Option<&Value>,
    ) -> Result<Response, ModelError> {
        let request = self.to_anthropic_request(messages, schema);

        self.client
            .post(self.messages_url())
            .header("x-api-key", self.config.api_key())
            .header("anthropic-version", ANTHROPIC_API_VERSION)
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
            429 => Err(ModelError::rate_limited(parse_retry_after(&error_body))),
            400 => {
                if error_body.contains("prompt is too long") {
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

        let body: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ModelError::parse(format!("Failed to parse response: {}", e)))?;

        parse_reply(body, structured)
    }
}

#[async_trait]
impl ChatModel for AnthropicChatModel {
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

fn parse_reply(body: AnthropicResponse, structured: bool) -> Result<ModelReply, ModelError> {
    if structured {
        if let Some(input) = body
            .content
            .iter()
            .find(|block| block.block_type == "tool_use")
            .and_then(|block| block.input.clone())
        {
            return Ok(ModelReply::Structured(input));
        }
        // The model declined the forced tool. Fall through to the text
        // rendering: callers treat a text reply under a schema request as a
        // contract violation and recover.
    }

    let text = body
        .content
        .into_iter()
        .filter_map(|block| {
            if block.block_type == "text" {
                block.text
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("");

    Ok(ModelReply::Text(text))
}

/// Parses retry-after out of an error response body.
fn parse_retry_after(error_body: &str) -> u32 {
    if let Ok(parsed) = serde_json::from_str::<Value>(error_body) {
        if let Some(msg) = parsed
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            if let Some(idx) = msg.find("try again in ") {
                let rest = &msg[idx + 13..];
                if let Some(num_end) = rest.find(|c: char| !c.is_ascii_digit()) {
                    if let Ok(secs) = rest[..num_end].parse::<u32>() {
                        return secs;
                    }
                }
            }
        }
    }
    60
}

// ----- Anthropic API types -----

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<AnthropicTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
}

#[derive(Debug, Serialize)]
struct AnthropicTool {
    name: String,
    description: String,
    input_schema: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
    input: Option<Value>,
}
