//! Retrieval pipeline orchestrator.
//!
//! The [`RetrievalPipeline`] coordinates the full ingest-and-answer workflow by
//! composing a [`DocumentStore`], a [`Chunker`], an [`Embedder`], a
//! [`VectorIndex`] and a [`CompletionModel`].
//!
//! # Example
//!
//! ```rust,ignore
//! use verdant_rag::{RagConfig, RetrievalPipeline};
//!
//! let mut pipeline = RetrievalPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedder(Arc::new(my_embedder))
//!     .completion_model(Arc::new(my_model))
//!     .build()?;
//!
//! pipeline.ingest("asset/2024_annual_report.pdf").await?;
//! let answer = pipeline.answer("What are the scope 1 emissions?").await?;
//! ```

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::config::RagConfig;
use crate::document::{QueryResult, Segment};
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::flat::FlatIndex;
use crate::index::VectorIndex;
use crate::llm::{CompletionModel, CompletionRequest};
use crate::loader::DocumentStore;
use crate::retry::Retrier;

/// The instruction sent with every answer-synthesis request.
pub const ANSWER_INSTRUCTION: &str = "You are an assistant for question-answering tasks. \
Answer the question using only the provided context. \
If the context does not contain the answer, say that you don't know. \
Keep the answer concise.";

/// Separator placed between retrieved segments in the context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Build the user prompt for answer synthesis.
pub fn answer_prompt(question: &str, context: &str) -> String {
    format!("Question: {question}\n\nContext:\n{context}\n\nAnswer:")
}

/// Join retrieved segment texts in ranked order.
pub fn context_block(results: &[QueryResult]) -> String {
    results.iter().map(|r| r.segment.text.as_str()).collect::<Vec<_>>().join(CONTEXT_SEPARATOR)
}

/// What [`RetrievalPipeline::ingest`] did with a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The file was loaded and its segments were added to the index.
    Indexed {
        /// Number of documents (pages or rows) loaded.
        documents: usize,
        /// Number of segments added to the index.
        segments: usize,
    },
    /// The file loaded but produced no text to index, e.g. a scanned PDF
    /// without a text layer. The path is recorded but the pipeline does not
    /// become ready on its account.
    NoContent {
        /// Number of documents (pages or rows) loaded.
        documents: usize,
    },
    /// The path had already been ingested by this pipeline instance.
    AlreadyIngested,
}

/// The retrieval pipeline orchestrator.
///
/// Owns its [`VectorIndex`] exclusively. Ingestion (load → chunk → embed →
/// index) takes `&mut self`; retrieval and answering take `&self`. Construct
/// one via [`RetrievalPipeline::builder()`].
pub struct RetrievalPipeline {
    config: RagConfig,
    store: DocumentStore,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn Embedder>,
    model: Arc<dyn CompletionModel>,
    index: Box<dyn VectorIndex>,
    retrier: Retrier,
    ingested: HashSet<PathBuf>,
}

impl RetrievalPipeline {
    /// Create a new [`RetrievalPipelineBuilder`].
    pub fn builder() -> RetrievalPipelineBuilder {
        RetrievalPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the vector index.
    pub fn index(&self) -> &dyn VectorIndex {
        self.index.as_ref()
    }

    /// Whether the index holds at least one segment to answer from.
    pub fn is_ready(&self) -> bool {
        !self.index.is_empty()
    }

    /// Whether any file has been ingested, including files without content.
    pub fn has_ingested_any(&self) -> bool {
        !self.ingested.is_empty()
    }

    /// Whether `path` has already been ingested by this instance.
    pub fn has_ingested(&self, path: impl AsRef<Path>) -> bool {
        self.ingested.contains(&normalize(path.as_ref()))
    }

    /// Embed the probe string and fix the index dimension from it.
    ///
    /// Call once at startup, before ingesting. Later ingests must then
    /// produce vectors of this width. Returns the observed dimension.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the index already has a
    /// different dimension, or the embedder's error after retries.
    pub async fn probe_dimensions(&mut self) -> Result<usize> {
        let embedder = &self.embedder;
        let dimension = self.retrier.run("embed", move || embedder.probe_dimensions()).await?;
        self.index.set_dimension(dimension).map_err(|e| {
            error!(error = %e, "embedder dimension drifted");
            e
        })?;
        debug!(dimension, "fixed index dimension");
        Ok(dimension)
    }

    /// Ingest one file: load → chunk → embed → index.
    ///
    /// Skipped when the same path was already ingested by this instance.
    /// Either every segment of the file is indexed or none is.
    ///
    /// # Errors
    ///
    /// Propagates loading errors ([`RagError::UnsupportedFileType`],
    /// [`RagError::FileNotFound`], [`RagError::Load`]), embedding errors
    /// including [`RagError::UpstreamUnavailable`], and
    /// [`RagError::DimensionMismatch`].
    pub async fn ingest(&mut self, path: impl AsRef<Path>) -> Result<IngestOutcome> {
        let path = path.as_ref();
        let key = normalize(path);
        if self.ingested.contains(&key) {
            info!(path = %path.display(), "skipping already ingested file");
            return Ok(IngestOutcome::AlreadyIngested);
        }

        // 1. Load off the async runtime; parsing is blocking.
        let store = self.store.clone();
        let owned = path.to_path_buf();
        let documents = tokio::task::spawn_blocking(move || store.load(&owned))
            .await
            .map_err(|e| RagError::PipelineError(format!("loader task failed: {e}")))??;

        // 2. Chunk every document
        let segments: Vec<Segment> =
            documents.iter().flat_map(|document| self.chunker.chunk(document)).collect();

        if segments.is_empty() {
            warn!(
                path = %path.display(),
                document_count = documents.len(),
                "file contains no text to index"
            );
            self.ingested.insert(key);
            return Ok(IngestOutcome::NoContent { documents: documents.len() });
        }

        // 3. Embed all segment texts
        let embeddings = {
            let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
            let texts = texts.as_slice();
            let embedder = &self.embedder;
            self.retrier.run("embed", move || embedder.embed_batch(texts)).await.map_err(|e| {
                error!(path = %path.display(), error = %e, "embedding failed during ingestion");
                e
            })?
        };

        if embeddings.len() != segments.len() {
            return Err(RagError::PipelineError(format!(
                "embedder returned {} vectors for {} segments",
                embeddings.len(),
                segments.len()
            )));
        }

        // 4. Swap into the index all at once
        let segment_count = segments.len();
        self.index.insert_batch(embeddings.into_iter().zip(segments).collect()).map_err(|e| {
            error!(path = %path.display(), error = %e, "index rejected embeddings");
            e
        })?;

        self.ingested.insert(key);
        info!(
            path = %path.display(),
            document_count = documents.len(),
            chunk_count = segment_count,
            "ingested file"
        );

        Ok(IngestOutcome::Indexed { documents: documents.len(), segments: segment_count })
    }

    /// Retrieve the `top_k` segments nearest to the question.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyCorpus`] while no segment has been indexed (no
    /// external call is made), otherwise embedding or index errors.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<QueryResult>> {
        self.retrieve_top_k(question, self.config.top_k).await
    }

    /// Like [`retrieve`](Self::retrieve) with an explicit `k`.
    pub async fn retrieve_top_k(&self, question: &str, k: usize) -> Result<Vec<QueryResult>> {
        if !self.is_ready() {
            return Err(RagError::EmptyCorpus);
        }

        let embedder = &self.embedder;
        let query_embedding =
            self.retrier.run("embed", move || embedder.embed(question)).await.map_err(|e| {
                error!(error = %e, "embedding failed during query");
                e
            })?;

        let results = self.index.query(&query_embedding, k)?;
        info!(result_count = results.len(), "query completed");
        Ok(results)
    }

    /// Answer a question from the ingested corpus.
    ///
    /// Retrieves the top segments, joins them with a blank line, and asks the
    /// completion model to answer using only that context. Returns the
    /// model's raw text.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyCorpus`] while no segment has been indexed (no
    /// external call is made), otherwise retrieval or completion errors.
    pub async fn answer(&self, question: &str) -> Result<String> {
        let results = self.retrieve(question).await?;
        let context = context_block(&results);
        let request = CompletionRequest::new(ANSWER_INSTRUCTION, answer_prompt(question, &context));

        let model = &self.model;
        let request = &request;
        let answer =
            self.retrier.run("complete", move || model.complete(request)).await.map_err(|e| {
                error!(model = model.name(), error = %e, "answer synthesis failed");
                e
            })?;

        info!(model = model.name(), context_segments = results.len(), "answered question");
        Ok(answer)
    }
}

/// Lexically normalize a path so `a/./b` and `a/c/../b` are tracked as one.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Builder for constructing a [`RetrievalPipeline`].
///
/// `embedder` and `completion_model` are required. When no chunker is set a
/// [`FixedSizeChunker`] is built from the config; when no index is set an
/// empty [`FlatIndex`] is used.
#[derive(Default)]
pub struct RetrievalPipelineBuilder {
    config: Option<RagConfig>,
    store: Option<DocumentStore>,
    chunker: Option<Arc<dyn Chunker>>,
    embedder: Option<Arc<dyn Embedder>>,
    model: Option<Arc<dyn CompletionModel>>,
    index: Option<Box<dyn VectorIndex>>,
}

impl RetrievalPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document store.
    pub fn document_store(mut self, store: DocumentStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedder.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the language model used for answer synthesis.
    pub fn completion_model(mut self, model: Arc<dyn CompletionModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the vector index. It is owned by the pipeline from here on.
    pub fn index(mut self, index: Box<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Build the [`RetrievalPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required field is missing or the
    /// default chunker cannot be built from the config.
    pub fn build(self) -> Result<RetrievalPipeline> {
        let config = self.config.unwrap_or_default();
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::ConfigError("embedder is required".to_string()))?;
        let model = self
            .model
            .ok_or_else(|| RagError::ConfigError("completion_model is required".to_string()))?;
        let chunker = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(FixedSizeChunker::from_config(&config)?),
        };
        let index = self.index.unwrap_or_else(|| Box::new(FlatIndex::new()));

        Ok(RetrievalPipeline {
            retrier: Retrier::new(config.retry.clone()),
            config,
            store: self.store.unwrap_or_default(),
            chunker,
            embedder,
            model,
            index,
            ingested: HashSet::new(),
        })
    }
}

/// One-shot helper: build a pipeline, ingest `path`, and answer `question`.
///
/// Builds a fresh pipeline on every call; keep a [`RetrievalPipeline`] around
/// to reuse an index across questions.
pub async fn analyze_document(
    question: &str,
    path: impl AsRef<Path>,
    config: RagConfig,
    embedder: Arc<dyn Embedder>,
    model: Arc<dyn CompletionModel>,
) -> Result<String> {
    let mut pipeline = RetrievalPipeline::builder()
        .config(config)
        .embedder(embedder)
        .completion_model(model)
        .build()?;
    pipeline.ingest(path).await?;
    pipeline.answer(question).await
}
