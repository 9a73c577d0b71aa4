//! Typed records exchanged with the judging model and returned to callers.

use serde::{Deserialize, Serialize};

use crate::category::GreenwashingCategory;

/// The judge's verdict on a statement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Analysis {
    /// Whether the statement is misleading given the evidence.
    pub is_greenwashing: bool,
    /// Justification quoting the evidence and naming applicable regulations.
    pub explanation: String,
    /// The best-fitting category when `is_greenwashing` is true.
    #[serde(default)]
    pub category: Option<GreenwashingCategory>,
}

impl Analysis {
    /// The verdict used when there is no company evidence to judge against.
    pub fn no_evidence() -> Self {
        Self {
            is_greenwashing: false,
            explanation: "No company information available; cannot confirm or deny greenwashing."
                .to_string(),
            category: None,
        }
    }
}

/// A corrected statement and how it improves on the original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rewrite {
    /// Accurate, transparent version of the statement.
    pub revised_statement: String,
    /// How the rewrite improves honesty.
    pub justification: String,
    /// Concise, evidence-based edits.
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Everything produced for one inspected statement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InspectionReport {
    /// The statement as submitted.
    pub statement: String,
    /// Company evidence retrieved from the report corpus.
    pub evidence: String,
    /// Regulations retrieved from the regulatory corpus.
    pub regulations: String,
    /// The verdict.
    pub analysis: Analysis,
    /// The corrected statement (the original when no greenwashing was found).
    pub rewrite: Rewrite,
}
