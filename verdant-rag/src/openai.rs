//! OpenAI embedding provider using the OpenAI embeddings API.
//!
//! This module is only available when the `openai` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::http::{self, ApiErrorResponse};

/// The default OpenAI API base URL.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// The default model for OpenAI embeddings.
const DEFAULT_MODEL: &str = "text-embedding-3-large";

/// The default number of inputs sent in one `/embeddings` request.
///
/// The API rejects requests with more than 2048 inputs.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

/// An [`Embedder`] backed by the OpenAI embeddings API or a compatible server.
///
/// Uses `reqwest` to call the `/embeddings` endpoint directly.
///
/// # Configuration
///
/// - `model` – defaults to `text-embedding-3-large`.
/// - `dimensions` – optional Matryoshka dimension override.
/// - `max_batch_size` – inputs per request, defaults to [`DEFAULT_MAX_BATCH_SIZE`].
/// - `base_url` – defaults to the public OpenAI API.
/// - `api_key` – from the constructor or the `OPENAI_API_KEY` environment variable.
///
/// # Example
///
/// ```rust,ignore
/// use verdant_rag::openai::OpenAIEmbedder;
///
/// let provider = OpenAIEmbedder::new("sk-...")?;
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct OpenAIEmbedder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    /// If set, passed to the API for Matryoshka dimension truncation.
    request_dimensions: Option<usize>,
    max_batch_size: usize,
}

impl OpenAIEmbedder {
    /// Create a new provider with the given API key.
    ///
    /// Uses the default model (`text-embedding-3-large`) at its native width.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::ConfigError("OpenAI API key must not be empty".into()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: OPENAI_API_BASE.into(),
            model: DEFAULT_MODEL.into(),
            request_dimensions: None,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        })
    }

    /// Create a new provider using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            RagError::ConfigError("OPENAI_API_KEY environment variable not set".into())
        })?;
        Self::new(api_key)
    }

    /// Set the model name (e.g. `text-embedding-3-small`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the provider at an OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the output dimensions (Matryoshka support).
    ///
    /// When set, the API returns embeddings truncated to this size.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.request_dimensions = Some(dims);
        self
    }

    /// Cap the number of inputs per request. Zero is treated as one.
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size.max(1);
        self
    }

    fn failure(message: String, retryable: bool) -> RagError {
        RagError::EmbeddingError { provider: "OpenAI".into(), message, retryable }
    }

    async fn request(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        debug!(
            provider = "OpenAI",
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let request_body =
            EmbeddingRequest { model: &self.model, input: texts, dimensions: self.request_dimensions };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "request failed");
                Self::failure(format!("request failed: {e}"), true)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = "OpenAI", %status, "API error");
            return Err(Self::failure(
                format!("API returned {status}: {detail}"),
                http::is_retryable_status(status),
            ));
        }

        let mut embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse response");
            Self::failure(format!("failed to parse response: {e}"), false)
        })?;

        if embedding_response.data.len() != texts.len() {
            return Err(Self::failure(
                format!(
                    "API returned {} embeddings for {} inputs",
                    embedding_response.data.len(),
                    texts.len()
                ),
                false,
            ));
        }

        // The API documents `index` but does not promise response order.
        embedding_response.data.sort_by_key(|d| d.index);
        Ok(embedding_response.data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Split `texts` into consecutive slices of at most `max` inputs.
fn request_batches<'a, 'b>(texts: &'a [&'b str], max: usize) -> std::slice::Chunks<'a, &'b str> {
    texts.chunks(max.max(1))
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

// ── Embedder implementation ────────────────────────────────────────

#[async_trait]
impl Embedder for OpenAIEmbedder {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "OpenAI", text_len = text.len(), "embedding single text");

        let results = self.embed_batch(&[text]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| Self::failure("API returned empty response".into(), false))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in request_batches(texts, self.max_batch_size) {
            embeddings.extend(self.request(batch).await?);
        }
        Ok(embeddings)
    }
}
