//! Error types for the `verdant-rag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// The file extension is not handled by any loader.
    #[error("Unsupported file type: {extension}. Supported types are: .pdf, .csv")]
    UnsupportedFileType {
        /// The offending extension, lower-cased, including the leading dot.
        extension: String,
    },

    /// The input path does not exist.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// The path that was requested.
        path: PathBuf,
    },

    /// The file exists but its content could not be extracted.
    #[error("Failed to load {}: {message}", path.display())]
    Load {
        /// The path being loaded.
        path: PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// A vector's length differs from the dimension fixed for the index.
    #[error("Dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension fixed for the index.
        expected: usize,
        /// The dimension of the rejected vector.
        actual: usize,
    },

    /// A query with `k > 0` was issued against an index holding no vectors.
    #[error("Vector index is empty")]
    EmptyIndex,

    /// `answer` or `retrieve` was called before any successful ingestion.
    #[error("No documents have been ingested into this pipeline")]
    EmptyCorpus,

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
        /// Whether repeating the request may succeed.
        retryable: bool,
    },

    /// An error occurred during language-model completion.
    #[error("Completion error ({provider}): {message}")]
    CompletionError {
        /// The model provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
        /// Whether repeating the request may succeed.
        retryable: bool,
    },

    /// An external call kept failing until the retry budget ran out.
    #[error("{service} unavailable after {attempts} attempt(s): {message}")]
    UpstreamUnavailable {
        /// The external operation that failed (`embed`, `complete`, ...).
        service: String,
        /// How many attempts were made.
        attempts: u32,
        /// The last failure observed.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error in the RAG pipeline orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),
}

impl RagError {
    /// Whether the retry layer should repeat the call that produced this error.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::EmbeddingError { retryable, .. } | Self::CompletionError { retryable, .. } => {
                *retryable
            }
            _ => false,
        }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
