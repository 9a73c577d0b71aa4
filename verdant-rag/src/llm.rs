//! Language-model completion trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single-turn completion request: one system instruction, one user prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRequest {
    /// The system instruction.
    pub system: String,
    /// The user prompt.
    pub prompt: String,
    /// Sampling temperature, if the caller wants to override the provider default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Ask the provider to constrain output to a JSON object when it supports that.
    #[serde(default)]
    pub json_output: bool,
}

impl CompletionRequest {
    /// Create a request with default sampling options.
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self { system: system.into(), prompt: prompt.into(), temperature: None, json_output: false }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Request JSON-object output.
    pub fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }
}

/// A language model that turns a [`CompletionRequest`] into free text.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// The model identifier used in logs and errors.
    fn name(&self) -> &str;

    /// Run the completion and return the model's raw text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
