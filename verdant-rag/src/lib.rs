//! # verdant-rag
//!
//! Retrieval-augmented generation over PDF and CSV documents.
//!
//! ## Overview
//!
//! A [`RetrievalPipeline`] loads a file through the [`DocumentStore`], splits
//! each page or row with a [`Chunker`], embeds the segments with an
//! [`Embedder`], and stores them in a [`VectorIndex`]. Questions are embedded
//! the same way, the nearest segments are retrieved, and a
//! [`CompletionModel`] answers from that context alone.
//!
//! - [`FixedSizeChunker`] - sliding character window with fixed overlap
//! - [`FlatIndex`] - exact search under squared Euclidean distance
//! - [`Retrier`] - per-call timeout with exponential-backoff retries
//! - `openai::OpenAIEmbedder` / `chat::ChatClient` - HTTP providers (`openai` feature)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use verdant_rag::{RagConfig, RetrievalPipeline};
//! use verdant_rag::chat::{ChatClient, ChatConfig};
//! use verdant_rag::openai::OpenAIEmbedder;
//!
//! let mut pipeline = RetrievalPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedder(Arc::new(OpenAIEmbedder::from_env()?))
//!     .completion_model(Arc::new(ChatClient::new(ChatConfig::groq_from_env("llama3-8b-8192")?)?))
//!     .build()?;
//!
//! pipeline.ingest("asset/2024_annual_report.pdf").await?;
//! println!("{}", pipeline.answer("What is the main topic of the document?").await?);
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod flat;
pub mod index;
pub mod llm;
pub mod loader;
pub mod pipeline;
pub mod retry;

#[cfg(feature = "openai")]
pub mod chat;
#[cfg(feature = "openai")]
mod http;
#[cfg(feature = "openai")]
pub mod openai;

pub use chunking::{Chunker, FixedSizeChunker};
pub use config::{RagConfig, RagConfigBuilder, RetryConfig};
pub use document::{Document, QueryResult, Segment, SourceLocation};
pub use embedding::{Embedder, PROBE_TEXT};
pub use error::{RagError, Result};
pub use flat::FlatIndex;
pub use index::VectorIndex;
pub use llm::{CompletionModel, CompletionRequest};
pub use loader::{CsvLoader, DocumentLoader, DocumentStore, FileKind, PdfLoader};
pub use pipeline::{IngestOutcome, RetrievalPipeline, RetrievalPipelineBuilder, analyze_document};
pub use retry::Retrier;

#[cfg(feature = "openai")]
pub use chat::{ChatClient, ChatConfig};
#[cfg(feature = "openai")]
pub use openai::OpenAIEmbedder;
