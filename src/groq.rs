//! Content generation via the Groq LLM API.
//!
//! This module contains the client for issuing a single non-streaming chat
//! completion request against the Groq OpenAI-compatible endpoint. Structured
//! output can be requested with a [`ResponseFormat`]; when a JSON format is
//! requested the response is parsed before being returned, and a parse failure
//! is an error rather than a silent fallback to raw text.

use log::{debug, error, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::GroqConfig;
use crate::error::{Error, Result};
use crate::oauth::build_bearer_auth_header;

/// The baseline model used when the caller does not specify one.
pub const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";

/// Chat completions endpoint of the Groq OpenAI-compatible API.
const CHAT_COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Fixed sampling temperature for all generations.
///
/// A deliberate creativity/consistency tradeoff for thread content; not
/// caller-configurable.
const TEMPERATURE: f64 = 0.75;

/// The response format to request from the model.
#[derive(Debug, Clone)]
pub enum ResponseFormat {
    /// Plain text output.
    Text,
    /// Any syntactically valid JSON object.
    JsonObject,
    /// JSON constrained to a caller-provided schema.
    JsonSchema {
        /// Schema name reported to the API.
        name: String,
        /// The JSON schema itself.
        schema: Value,
    },
}

impl ResponseFormat {
    /// Renders the format as the `response_format` request field.
    pub(crate) fn to_request_value(&self) -> Value {
        match self {
            ResponseFormat::Text => json!({ "type": "text" }),
            ResponseFormat::JsonObject => json!({ "type": "json_object" }),
            ResponseFormat::JsonSchema { name, schema } => json!({
                "type": "json_schema",
                "json_schema": {
                    "name": name,
                    "schema": schema,
                }
            }),
        }
    }

    /// Whether this format requires the response content to parse as JSON.
    fn expects_json(&self) -> bool {
        matches!(
            self,
            ResponseFormat::JsonObject | ResponseFormat::JsonSchema { .. }
        )
    }
}

/// The result of a generation call: structured JSON when a JSON response
/// format was requested, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedContent {
    /// Raw text returned unmodified from the model.
    Text(String),
    /// Parsed structured value.
    Json(Value),
}

impl GeneratedContent {
    /// Returns the raw text if this is a text result.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            GeneratedContent::Text(text) => Some(text),
            GeneratedContent::Json(_) => None,
        }
    }

    /// Returns the parsed value if this is a structured result.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            GeneratedContent::Json(value) => Some(value),
            GeneratedContent::Text(_) => None,
        }
    }
}

/// Standard chat-completion response envelope; only the first choice's
/// message content is consumed.
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Client for the Groq chat completions API.
///
/// # Example
///
/// ```rust,no_run
/// use threadpost::{GroqClient, ResponseFormat};
///
/// #[tokio::main]
/// async fn main() {
///     let client = GroqClient::from_env().unwrap();
///     let result = client
///         .generate("You are a concise assistant.", "Say hello.", None, None)
///         .await;
///     match result {
///         Ok(content) => println!("Generated: {:?}", content),
///         Err(e) => eprintln!("Generation failed: {}", e),
///     }
/// }
/// ```
pub struct GroqClient {
    http: Client,
    config: GroqConfig,
}

impl GroqClient {
    /// Creates a new client with the given configuration and default HTTP
    /// client settings (no explicit request timeout).
    pub fn new(config: GroqConfig) -> Self {
        GroqClient {
            http: Client::new(),
            config,
        }
    }

    /// Creates a new client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be constructed.
    pub fn with_timeout(config: GroqConfig, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(GroqClient { http, config })
    }

    /// Creates a client from the `GROQ_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] if the variable is not set.
    pub fn from_env() -> Result<Self> {
        Ok(GroqClient::new(GroqConfig::from_env()?))
    }

    /// Generates a response from the Groq API using the provided model.
    ///
    /// Issues one non-streaming chat completion request with the system and
    /// user messages in that role order and the temperature fixed at 0.75.
    /// The `response_format` field is sent only when provided. No retries are
    /// made; each call is a single request attempt.
    ///
    /// # Parameters
    ///
    /// - `system_prompt`: The system prompt defining the model's role and rules
    /// - `user_prompt`: The user prompt containing the specific request
    /// - `model`: The model to use; defaults to [`DEFAULT_MODEL`] when `None`
    /// - `response_format`: The desired response format, if any
    ///
    /// # Returns
    ///
    /// - `Ok(GeneratedContent::Json)` when a JSON format was requested and the
    ///   content parsed successfully
    /// - `Ok(GeneratedContent::Text)` otherwise, with the content unmodified
    ///
    /// # Errors
    ///
    /// - [`Error::Api`] or [`Error::Http`] if the request fails
    /// - [`Error::EmptyResponse`] if the completion carries no content
    /// - [`Error::InvalidResponseFormat`] if a JSON format was requested and
    ///   the content did not parse; carries the raw payload for diagnostics
    pub async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: Option<&str>,
        response_format: Option<ResponseFormat>,
    ) -> Result<GeneratedContent> {
        let model = model.unwrap_or(DEFAULT_MODEL);
        info!("Generating content with Groq API using model: {}...", model);

        let mut payload = json!({
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt },
            ],
            "model": model,
            "temperature": TEMPERATURE,
        });
        if let Some(format) = &response_format {
            payload["response_format"] = format.to_request_value();
        }
        debug!("Chat completion payload prepared for model {}", model);

        let response = self
            .http
            .post(CHAT_COMPLETIONS_URL)
            .header("Authorization", build_bearer_auth_header(&self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        debug!("Groq API responded with status: {}", status);
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Groq API request failed with status {}", status);
            return Err(Error::Api { status, body });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(Error::EmptyResponse)?;

        parse_generated(content, response_format.as_ref())
    }
}

/// Interprets raw completion content according to the requested format.
///
/// When a JSON format was requested, the content must parse as JSON; a parse
/// failure carries the raw payload rather than falling back to text.
pub(crate) fn parse_generated(
    content: String,
    format: Option<&ResponseFormat>,
) -> Result<GeneratedContent> {
    match format {
        Some(format) if format.expects_json() => match serde_json::from_str(&content) {
            Ok(value) => Ok(GeneratedContent::Json(value)),
            Err(source) => {
                error!("Failed to parse LLM JSON response: {}", source);
                error!("Raw LLM output: {}", content);
                Err(Error::InvalidResponseFormat {
                    raw: content,
                    source,
                })
            }
        },
        _ => Ok(GeneratedContent::Text(content)),
    }
}
