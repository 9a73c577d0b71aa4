//! Error types for the `verdant-inspector` crate.

use thiserror::Error;
use verdant_rag::RagError;

/// Errors that can occur while inspecting a statement.
#[derive(Debug, Error)]
pub enum InspectError {
    /// Retrieval or a model call failed.
    #[error(transparent)]
    Rag(#[from] RagError),

    /// The judging model did not return the expected JSON record.
    #[error("Malformed {stage} response: {message}")]
    MalformedResponse {
        /// Which step produced the response (`analysis` or `rewrite`).
        stage: &'static str,
        /// Why the response was rejected.
        message: String,
    },
}

/// A convenience result type for inspection.
pub type Result<T> = std::result::Result<T, InspectError>;
