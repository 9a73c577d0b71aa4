//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use verdant_rag::chat::DEFAULT_GROQ_MODEL;
use verdant_rag::openai::DEFAULT_MAX_BATCH_SIZE;
use verdant_rag::{RagConfig, RetryConfig};

/// Default judging model on Groq.
pub const DEFAULT_JUDGE_MODEL: &str = "qwen-qwq-32b";

/// Default OpenAI embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-large";

#[derive(Parser, Debug)]
#[command(name = "verdant", author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub rag: RagArgs,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer a question from one PDF or CSV file
    Ask {
        /// Document to ingest
        #[arg(long)]
        file: PathBuf,
        /// Question to answer
        question: String,
    },
    /// Check a marketing statement against a company report and regulations
    Inspect {
        /// Company report (PDF or CSV)
        #[arg(long)]
        report: PathBuf,
        /// Regulations corpus (PDF or CSV)
        #[arg(long)]
        regulations: PathBuf,
        /// Print the report on a single line
        #[arg(long)]
        compact: bool,
        /// Statement to inspect
        statement: String,
    },
}

/// Retrieval and model settings shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct RagArgs {
    /// Segment length in characters
    #[arg(long, default_value_t = 1000, global = true)]
    pub chunk_size: usize,

    /// Characters shared by consecutive segments
    #[arg(long, default_value_t = 200, global = true)]
    pub chunk_overlap: usize,

    /// Segments retrieved per question
    #[arg(long, default_value_t = 4, global = true)]
    pub top_k: usize,

    /// Groq model answering from retrieved context
    #[arg(long, env = "VERDANT_ANSWER_MODEL", default_value = DEFAULT_GROQ_MODEL, global = true)]
    pub answer_model: String,

    /// Groq model judging statements
    #[arg(long, env = "VERDANT_JUDGE_MODEL", default_value = DEFAULT_JUDGE_MODEL, global = true)]
    pub judge_model: String,

    /// OpenAI embedding model
    #[arg(long, env = "VERDANT_EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL, global = true)]
    pub embedding_model: String,

    /// Requested embedding width, for models that support truncation
    #[arg(long, global = true)]
    pub embedding_dimensions: Option<usize>,

    /// Maximum inputs per embeddings request
    #[arg(long, default_value_t = DEFAULT_MAX_BATCH_SIZE, global = true)]
    pub embedding_batch_size: usize,

    /// Attempts per external call
    #[arg(long, default_value_t = 3, global = true)]
    pub max_attempts: u32,

    /// Deadline per external call, in seconds
    #[arg(long, default_value_t = 60, global = true)]
    pub timeout_secs: u64,
}

impl RagArgs {
    /// Validate the flags into a pipeline configuration.
    pub fn config(&self) -> verdant_rag::Result<RagConfig> {
        RagConfig::builder()
            .chunk_size(self.chunk_size)
            .chunk_overlap(self.chunk_overlap)
            .top_k(self.top_k)
            .retry(RetryConfig {
                max_attempts: self.max_attempts,
                timeout: Duration::from_secs(self.timeout_secs),
                ..RetryConfig::default()
            })
            .build()
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_after_the_subcommand_are_accepted() {
        let cli = Cli::try_parse_from([
            "verdant",
            "ask",
            "--file",
            "report.pdf",
            "What is the main topic?",
            "--top-k",
            "2",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.rag.top_k, 2);
        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Command::Ask { file, question } => {
                assert_eq!(file, PathBuf::from("report.pdf"));
                assert_eq!(question, "What is the main topic?");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn defaults_build_a_valid_config() {
        let cli = Cli::try_parse_from([
            "verdant",
            "inspect",
            "--report",
            "r.csv",
            "--regulations",
            "l.csv",
            "We are carbon neutral",
        ])
        .unwrap();

        let config = cli.rag.config().unwrap();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.top_k, 4);
        assert_eq!(cli.rag.embedding_batch_size, DEFAULT_MAX_BATCH_SIZE);
    }

    #[test]
    fn overlap_not_below_size_is_rejected() {
        let cli = Cli::try_parse_from([
            "verdant",
            "ask",
            "--file",
            "a.csv",
            "q",
            "--chunk-size",
            "100",
            "--chunk-overlap",
            "100",
        ])
        .unwrap();

        assert!(cli.rag.config().is_err());
    }
}
