//! The inspection workflow: retrieve evidence and regulations, judge, rewrite.

use std::sync::Arc;

use tracing::{info, warn};
use verdant_rag::{
    CompletionModel, CompletionRequest, RagError, Retrier, RetrievalPipeline, RetryConfig,
};

use crate::error::Result;
use crate::parse::parse_record;
use crate::prompts;
use crate::report::{Analysis, InspectionReport, Rewrite};

/// Checks marketing statements against a company report and a body of regulations.
///
/// Each corpus lives in its own [`RetrievalPipeline`]; both must have been
/// ingested before [`inspect`](Inspector::inspect) is called.
///
/// # Example
///
/// ```rust,ignore
/// use verdant_inspector::Inspector;
///
/// report.ingest("asset/2024_annual_report.pdf").await?;
/// laws.ingest("asset/greenwashing_laws.csv").await?;
///
/// let inspector = Inspector::new(report, laws, judge);
/// let report = inspector.inspect("Our operations are 100% carbon neutral").await?;
/// ```
pub struct Inspector {
    evidence: RetrievalPipeline,
    regulations: RetrievalPipeline,
    judge: Arc<dyn CompletionModel>,
    retrier: Retrier,
}

impl Inspector {
    /// Create an inspector with the default retry policy for judge calls.
    pub fn new(
        evidence: RetrievalPipeline,
        regulations: RetrievalPipeline,
        judge: Arc<dyn CompletionModel>,
    ) -> Self {
        Self { evidence, regulations, judge, retrier: Retrier::default() }
    }

    /// Use `retry` for judge calls.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retrier = Retrier::new(retry);
        self
    }

    /// The company-report pipeline.
    pub fn evidence_pipeline(&mut self) -> &mut RetrievalPipeline {
        &mut self.evidence
    }

    /// The regulations pipeline.
    pub fn regulations_pipeline(&mut self) -> &mut RetrievalPipeline {
        &mut self.regulations
    }

    /// Run the full workflow for one statement.
    ///
    /// # Errors
    ///
    /// Fails with [`RagError::EmptyCorpus`] (wrapped) if a pipeline was never
    /// ingested. A corpus whose files held no text yields empty retrieval text
    /// instead. Propagates other retrieval and model errors; returns
    /// [`InspectError::MalformedResponse`](crate::InspectError::MalformedResponse)
    /// when the judge's output does not decode.
    pub async fn inspect(&self, statement: &str) -> Result<InspectionReport> {
        let evidence = retrieve_text(&self.evidence, &prompts::evidence_question(statement)).await?;
        let regulations =
            retrieve_text(&self.regulations, &prompts::regulations_question(statement)).await?;

        let analysis = self.analyze(statement, &evidence, &regulations).await?;
        let rewrite = self.rewrite(statement, &analysis).await?;

        info!(
            is_greenwashing = analysis.is_greenwashing,
            category = analysis.category.map(|c| c.as_str()),
            suggestion_count = rewrite.suggestions.len(),
            "inspected statement"
        );

        Ok(InspectionReport {
            statement: statement.to_string(),
            evidence,
            regulations,
            analysis,
            rewrite,
        })
    }

    /// Judge `statement` against the retrieved text.
    ///
    /// Returns [`Analysis::no_evidence`] without calling the model when the
    /// evidence is blank.
    pub async fn analyze(
        &self,
        statement: &str,
        evidence: &str,
        regulations: &str,
    ) -> Result<Analysis> {
        if evidence.trim().is_empty() {
            warn!("no company evidence retrieved, skipping analysis");
            return Ok(Analysis::no_evidence());
        }

        let request = CompletionRequest::new(
            prompts::ANALYSIS_SYSTEM,
            prompts::analysis_prompt(statement, evidence, regulations),
        )
        .with_temperature(0.0)
        .with_json_output();

        let raw = self.ask(&request).await?;
        let mut analysis: Analysis = parse_record("analysis", &raw)?;
        if !analysis.is_greenwashing {
            analysis.category = None;
        }
        Ok(analysis)
    }

    /// Produce a corrected statement.
    ///
    /// When the analysis found no greenwashing the original statement is
    /// echoed with the analysis explanation and no model call is made.
    pub async fn rewrite(&self, statement: &str, analysis: &Analysis) -> Result<Rewrite> {
        if !analysis.is_greenwashing {
            return Ok(Rewrite {
                revised_statement: statement.to_string(),
                justification: analysis.explanation.clone(),
                suggestions: Vec::new(),
            });
        }

        let request = CompletionRequest::new(
            prompts::REWRITE_SYSTEM,
            prompts::rewrite_prompt(statement, analysis),
        )
        .with_json_output();

        let raw = self.ask(&request).await?;
        parse_record("rewrite", &raw)
    }

    async fn ask(&self, request: &CompletionRequest) -> Result<String> {
        let judge = &self.judge;
        Ok(self.retrier.run("complete", move || judge.complete(request)).await?)
    }
}

/// Answer `question` from `pipeline`, or return an empty string when its
/// files were ingested but contained no text.
async fn retrieve_text(pipeline: &RetrievalPipeline, question: &str) -> Result<String> {
    match pipeline.answer(question).await {
        Err(RagError::EmptyCorpus) if pipeline.has_ingested_any() => {
            warn!("corpus has no indexed text, continuing without it");
            Ok(String::new())
        }
        other => Ok(other?),
    }
}
