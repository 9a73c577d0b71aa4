//! End-to-end tests for the retrieval pipeline with in-process providers.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use verdant_rag::pipeline::ANSWER_INSTRUCTION;
use verdant_rag::{
    CompletionModel, CompletionRequest, Embedder, IngestOutcome, RagConfig, RagError,
    RetrievalPipeline, RetryConfig, VectorIndex, analyze_document,
};

const KEYWORDS: [&str; 4] = ["carbon", "water", "waste", "solar"];

/// Embeds text as keyword counts so nearest neighbours are predictable.
#[derive(Default)]
struct KeywordEmbedder {
    calls: AtomicUsize,
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn name(&self) -> &str {
        "keywords"
    }

    async fn embed(&self, text: &str) -> verdant_rag::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let lower = text.to_lowercase();
        Ok(KEYWORDS.iter().map(|k| lower.matches(k).count() as f32).collect())
    }
}

/// Always fails with a retryable error.
#[derive(Default)]
struct FlakyEmbedder {
    calls: AtomicUsize,
}

#[async_trait]
impl Embedder for FlakyEmbedder {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn embed(&self, _text: &str) -> verdant_rag::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RagError::EmbeddingError {
            provider: "flaky".into(),
            message: "503 Service Unavailable".into(),
            retryable: true,
        })
    }
}

/// Produces one dimension for documents and another for everything after.
struct DriftingEmbedder {
    batches: AtomicUsize,
}

#[async_trait]
impl Embedder for DriftingEmbedder {
    fn name(&self) -> &str {
        "drifting"
    }

    async fn embed(&self, _text: &str) -> verdant_rag::Result<Vec<f32>> {
        Ok(vec![0.0; 2])
    }

    async fn embed_batch(&self, texts: &[&str]) -> verdant_rag::Result<Vec<Vec<f32>>> {
        let dim = if self.batches.fetch_add(1, Ordering::SeqCst) == 0 { 3 } else { 2 };
        Ok(texts.iter().map(|_| vec![0.0; dim]).collect())
    }
}

/// Single embeddings are one dimension wider than batch embeddings.
struct SplitEmbedder;

#[async_trait]
impl Embedder for SplitEmbedder {
    fn name(&self) -> &str {
        "split"
    }

    async fn embed(&self, _text: &str) -> verdant_rag::Result<Vec<f32>> {
        Ok(vec![0.0; 4])
    }

    async fn embed_batch(&self, texts: &[&str]) -> verdant_rag::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![0.0; 3]).collect())
    }
}

/// Records every request and answers with a fixed string.
#[derive(Default)]
struct RecordingModel {
    requests: Mutex<Vec<CompletionRequest>>,
}

impl RecordingModel {
    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionModel for RecordingModel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: &CompletionRequest) -> verdant_rag::Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        Ok("recorded answer".to_string())
    }
}

fn test_config() -> RagConfig {
    RagConfig::builder()
        .chunk_size(200)
        .chunk_overlap(20)
        .top_k(2)
        .retry(RetryConfig {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(10),
            timeout: Duration::from_secs(1),
        })
        .build()
        .unwrap()
}

fn report_csv(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("report.csv");
    std::fs::write(
        &path,
        "topic,content\n\
         climate,Our carbon emissions fell by 12% while carbon offsets were purchased.\n\
         water,Water withdrawal rose in two water-stressed regions.\n\
         energy,Solar panels now cover three solar-ready warehouses.\n",
    )
    .unwrap();
    path
}

fn pipeline(
    embedder: Arc<dyn Embedder>,
    model: Arc<dyn CompletionModel>,
) -> RetrievalPipeline {
    RetrievalPipeline::builder()
        .config(test_config())
        .embedder(embedder)
        .completion_model(model)
        .build()
        .unwrap()
}

#[tokio::test]
async fn answer_before_ingest_fails_without_external_calls() {
    let embedder = Arc::new(KeywordEmbedder::default());
    let model = Arc::new(RecordingModel::default());
    let pipeline = pipeline(embedder.clone(), model.clone());

    let err = pipeline.answer("Is the company carbon neutral?").await.unwrap_err();
    assert!(matches!(err, RagError::EmptyCorpus));
    assert!(!pipeline.is_ready());
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn ingest_is_idempotent_per_path() {
    let dir = TempDir::new().unwrap();
    let path = report_csv(&dir);
    let embedder = Arc::new(KeywordEmbedder::default());
    let mut pipeline = pipeline(embedder.clone(), Arc::new(RecordingModel::default()));

    let outcome = pipeline.ingest(&path).await.unwrap();
    assert_eq!(outcome, IngestOutcome::Indexed { documents: 3, segments: 3 });
    assert_eq!(pipeline.index().len(), 3);
    let calls_after_first = embedder.calls.load(Ordering::SeqCst);

    let dotted = dir.path().join(".").join("report.csv");
    assert_eq!(pipeline.ingest(&dotted).await.unwrap(), IngestOutcome::AlreadyIngested);
    assert_eq!(pipeline.index().len(), 3);
    assert_eq!(embedder.calls.load(Ordering::SeqCst), calls_after_first);
    assert!(pipeline.has_ingested(&path));
}

#[tokio::test]
async fn answer_sends_ranked_context_to_the_model() {
    let dir = TempDir::new().unwrap();
    let path = report_csv(&dir);
    let model = Arc::new(RecordingModel::default());
    let mut pipeline = pipeline(Arc::new(KeywordEmbedder::default()), model.clone());
    pipeline.ingest(&path).await.unwrap();

    let results = pipeline.retrieve("carbon carbon water").await.unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].segment.text.starts_with("Our carbon emissions"));
    assert!(results[1].segment.text.starts_with("Water withdrawal"));

    let answer = pipeline.answer("carbon carbon water").await.unwrap();
    assert_eq!(answer, "recorded answer");

    let requests = model.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].system, ANSWER_INSTRUCTION);
    let expected_context = format!("{}\n\n{}", results[0].segment.text, results[1].segment.text);
    assert!(requests[0].prompt.contains("Question: carbon carbon water"));
    assert!(requests[0].prompt.contains(&expected_context));
}

#[tokio::test(start_paused = true)]
async fn failed_embedding_leaves_the_pipeline_uninitialized() {
    let dir = TempDir::new().unwrap();
    let path = report_csv(&dir);
    let embedder = Arc::new(FlakyEmbedder::default());
    let mut pipeline = pipeline(embedder.clone(), Arc::new(RecordingModel::default()));

    let err = pipeline.ingest(&path).await.unwrap_err();
    match err {
        RagError::UpstreamUnavailable { service, attempts, .. } => {
            assert_eq!(service, "embed");
            assert_eq!(attempts, 2);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(pipeline.index().is_empty());
    assert!(!pipeline.is_ready());
    assert!(!pipeline.has_ingested(&path));
    assert!(matches!(pipeline.answer("anything").await, Err(RagError::EmptyCorpus)));
}

#[tokio::test]
async fn dimension_drift_is_rejected_atomically() {
    let dir = TempDir::new().unwrap();
    let first = report_csv(&dir);
    let second = dir.path().join("laws.csv");
    std::fs::write(&second, "content\nClaims must be substantiated.\n").unwrap();

    let embedder = Arc::new(DriftingEmbedder { batches: AtomicUsize::new(0) });
    let mut pipeline = pipeline(embedder, Arc::new(RecordingModel::default()));

    pipeline.ingest(&first).await.unwrap();
    let err = pipeline.ingest(&second).await.unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 3, actual: 2 }));
    assert_eq!(pipeline.index().len(), 3);
    assert!(!pipeline.has_ingested(&second));

    let err = pipeline.probe_dimensions().await.unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 3, actual: 2 }));
    assert_eq!(pipeline.index().dimension(), Some(3));
}

#[tokio::test]
async fn unsupported_file_is_reported_and_nothing_is_indexed() {
    let embedder = Arc::new(KeywordEmbedder::default());
    let mut pipeline = pipeline(embedder.clone(), Arc::new(RecordingModel::default()));

    let err = pipeline.ingest("report.docx").await.unwrap_err();
    assert!(matches!(err, RagError::UnsupportedFileType { .. }));
    assert!(!pipeline.is_ready());
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn dimension_check_fixes_the_index_dimension() {
    let mut pipeline = pipeline(
        Arc::new(KeywordEmbedder::default()),
        Arc::new(RecordingModel::default()),
    );
    assert_eq!(pipeline.index().dimension(), None);

    assert_eq!(pipeline.probe_dimensions().await.unwrap(), KEYWORDS.len());
    assert_eq!(pipeline.index().dimension(), Some(KEYWORDS.len()));
    assert!(!pipeline.is_ready());

    // Probing again with the same embedder is harmless.
    assert_eq!(pipeline.probe_dimensions().await.unwrap(), KEYWORDS.len());
}

#[tokio::test]
async fn ingest_rejects_vectors_narrower_than_the_checked_dimension() {
    let dir = TempDir::new().unwrap();
    let path = report_csv(&dir);
    let mut pipeline = pipeline(Arc::new(SplitEmbedder), Arc::new(RecordingModel::default()));

    assert_eq!(pipeline.probe_dimensions().await.unwrap(), 4);
    let err = pipeline.ingest(&path).await.unwrap_err();

    assert!(matches!(err, RagError::DimensionMismatch { expected: 4, actual: 3 }));
    assert!(pipeline.index().is_empty());
    assert!(!pipeline.is_ready());
    assert!(!pipeline.has_ingested(&path));
}

#[tokio::test]
async fn file_without_text_does_not_make_the_pipeline_ready() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scanned.csv");
    std::fs::write(&path, "content\n\"\"\n").unwrap();
    let embedder = Arc::new(KeywordEmbedder::default());
    let model = Arc::new(RecordingModel::default());
    let mut pipeline = pipeline(embedder.clone(), model.clone());

    let outcome = pipeline.ingest(&path).await.unwrap();
    assert_eq!(outcome, IngestOutcome::NoContent { documents: 1 });
    assert!(!pipeline.is_ready());
    assert!(pipeline.has_ingested_any());
    assert!(pipeline.has_ingested(&path));
    assert_eq!(pipeline.ingest(&path).await.unwrap(), IngestOutcome::AlreadyIngested);

    assert!(matches!(pipeline.answer("anything").await, Err(RagError::EmptyCorpus)));
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(model.calls(), 0);

    // A later file with text still brings the pipeline up.
    pipeline.ingest(report_csv(&dir)).await.unwrap();
    assert!(pipeline.is_ready());
}

#[tokio::test]
async fn analyze_document_builds_ingests_and_answers() {
    let dir = TempDir::new().unwrap();
    let path = report_csv(&dir);
    let model = Arc::new(RecordingModel::default());

    let answer = analyze_document(
        "What about solar?",
        &path,
        test_config(),
        Arc::new(KeywordEmbedder::default()),
        model.clone(),
    )
    .await
    .unwrap();

    assert_eq!(answer, "recorded answer");
    assert!(model.requests.lock().unwrap()[0].prompt.contains("Solar panels"));
}
