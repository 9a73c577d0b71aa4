//! Chat-completions client for OpenAI-compatible APIs (Groq, OpenAI, vLLM, ...).
//!
//! This module is only available when the `openai` feature is enabled.
//!
//! # Example
//!
//! ```rust,ignore
//! use verdant_rag::chat::{ChatClient, ChatConfig};
//!
//! let model = ChatClient::new(ChatConfig::groq(
//!     std::env::var("GROQ_API_KEY")?,
//!     "llama3-8b-8192",
//! ))?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{RagError, Result};
use crate::http::{self, ApiErrorResponse};
use crate::llm::{CompletionModel, CompletionRequest};
use crate::openai::OPENAI_API_BASE;

/// Groq's OpenAI-compatible API base URL.
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Default answering model on Groq.
pub const DEFAULT_GROQ_MODEL: &str = "llama3-8b-8192";

/// Connection settings for a [`ChatClient`].
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Provider label used in logs and errors.
    pub provider: String,
    /// Bearer token.
    pub api_key: String,
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
}

impl ChatConfig {
    /// Settings for an arbitrary OpenAI-compatible server.
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider: "OpenAI-compatible".into(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    /// Settings for Groq.
    pub fn groq(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self { provider: "Groq".into(), ..Self::compatible(api_key, GROQ_API_BASE, model) }
    }

    /// Settings for OpenAI.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self { provider: "OpenAI".into(), ..Self::compatible(api_key, OPENAI_API_BASE, model) }
    }

    /// Groq settings with the key from `GROQ_API_KEY`.
    pub fn groq_from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY").map_err(|_| {
            RagError::ConfigError("GROQ_API_KEY environment variable not set".into())
        })?;
        Ok(Self::groq(api_key, model))
    }
}

/// A [`CompletionModel`] speaking the `/chat/completions` protocol.
pub struct ChatClient {
    client: reqwest::Client,
    config: ChatConfig,
}

impl ChatClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the API key or model is empty.
    pub fn new(config: ChatConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(RagError::ConfigError(format!(
                "{} API key must not be empty",
                config.provider
            )));
        }
        if config.model.is_empty() {
            return Err(RagError::ConfigError("model must not be empty".into()));
        }
        Ok(Self { client: reqwest::Client::new(), config })
    }

    fn failure(&self, message: String, retryable: bool) -> RagError {
        RagError::CompletionError { provider: self.config.provider.clone(), message, retryable }
    }
}

// ── Chat completions request/response types ────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl CompletionModel for ChatClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        debug!(
            provider = %self.config.provider,
            model = %self.config.model,
            prompt_len = request.prompt.len(),
            "chat completion"
        );

        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.prompt },
            ],
            temperature: request.temperature,
            response_format: request.json_output.then_some(ResponseFormat { kind: "json_object" }),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = %self.config.provider, error = %e, "request failed");
                self.failure(format!("request failed: {e}"), true)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);

            error!(provider = %self.config.provider, %status, "API error");
            return Err(self.failure(
                format!("API returned {status}: {detail}"),
                http::is_retryable_status(status),
            ));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = %self.config.provider, error = %e, "failed to parse response");
            self.failure(format!("failed to parse response: {e}"), false)
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| self.failure("API returned no message content".into(), false))
    }
}
