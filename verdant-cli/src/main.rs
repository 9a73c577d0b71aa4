//! `verdant`: ask questions of a document or inspect a statement for greenwashing.

mod cli;
mod telemetry;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use verdant_inspector::Inspector;
use verdant_rag::{ChatClient, ChatConfig, Embedder, OpenAIEmbedder, RagConfig, RetrievalPipeline};

use crate::cli::{Cli, Command, RagArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    telemetry::init(cli.log_format)?;

    let config = cli.rag.config().context("invalid retrieval settings")?;
    let embedder = embedder(&cli.rag)?;

    match cli.command {
        Command::Ask { file, question } => {
            let mut pipeline = pipeline(&config, embedder, &cli.rag.answer_model)?;
            prepare(&mut pipeline, &file).await?;
            let answer = pipeline.answer(&question).await?;
            println!("{answer}");
        }
        Command::Inspect { report, regulations, compact, statement } => {
            let evidence = pipeline(&config, embedder.clone(), &cli.rag.answer_model)?;
            let laws = pipeline(&config, embedder, &cli.rag.answer_model)?;
            let judge = ChatClient::new(ChatConfig::groq_from_env(&cli.rag.judge_model)?)?;
            let mut inspector =
                Inspector::new(evidence, laws, Arc::new(judge)).with_retry(config.retry.clone());

            prepare(inspector.evidence_pipeline(), &report).await?;
            prepare(inspector.regulations_pipeline(), &regulations).await?;

            let result = inspector.inspect(&statement).await?;

            let json = if compact {
                serde_json::to_string(&result)?
            } else {
                serde_json::to_string_pretty(&result)?
            };
            println!("{json}");
        }
    }

    Ok(())
}

fn embedder(args: &RagArgs) -> anyhow::Result<Arc<dyn Embedder>> {
    let mut embedder = OpenAIEmbedder::from_env()?
        .with_model(&args.embedding_model)
        .with_max_batch_size(args.embedding_batch_size);
    if let Some(dims) = args.embedding_dimensions {
        embedder = embedder.with_dimensions(dims);
    }
    Ok(Arc::new(embedder))
}

fn pipeline(
    config: &RagConfig,
    embedder: Arc<dyn Embedder>,
    answer_model: &str,
) -> anyhow::Result<RetrievalPipeline> {
    let model = ChatClient::new(ChatConfig::groq_from_env(answer_model)?)?;
    Ok(RetrievalPipeline::builder()
        .config(config.clone())
        .embedder(embedder)
        .completion_model(Arc::new(model))
        .build()?)
}

async fn prepare(pipeline: &mut RetrievalPipeline, path: &Path) -> anyhow::Result<()> {
    let dimension = pipeline.probe_dimensions().await.context("embedding service probe failed")?;
    info!(dimension, "embedding service ready");
    pipeline
        .ingest(path)
        .await
        .with_context(|| format!("failed to ingest {}", path.display()))?;
    Ok(())
}
