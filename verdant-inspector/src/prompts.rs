//! Prompt text for retrieval and judging.

use crate::category::GreenwashingCategory;
use crate::report::Analysis;

/// Question asked of the company-report corpus.
pub fn evidence_question(statement: &str) -> String {
    format!("Return ALL the evidence most relevant to the statement: {statement}")
}

/// Question asked of the regulations corpus.
pub fn regulations_question(statement: &str) -> String {
    format!("Return ALL the regulations most relevant to the statement: {statement}")
}

/// System instruction for the verdict.
pub const ANALYSIS_SYSTEM: &str = "You are a sustainability analyst. Detect greenwashing in \
marketing copy using only the company information and regulations provided. \
Respond with a single JSON object and nothing else.";

/// System instruction for the rewrite.
pub const REWRITE_SYSTEM: &str = "You are a copy editor focused on sustainability accuracy. \
Rewrite marketing copy to avoid greenwashing. Respond with a single JSON object and nothing else.";

/// User prompt asking for an [`Analysis`] record.
pub fn analysis_prompt(statement: &str, evidence: &str, regulations: &str) -> String {
    let categories = GreenwashingCategory::ALL
        .iter()
        .map(|c| format!("  - \"{}\": {}", c.as_str(), c.description()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "User claim: \"{statement}\"\n\n\
         Company info (retrieved):\n{evidence}\n\n\
         Regulations (retrieved):\n{regulations}\n\n\
         Categories:\n{categories}\n\n\
         Respond with JSON exactly in this form:\n\
         {{\n  \"is_greenwashing\": <true|false>,\n  \
         \"explanation\": \"<quote relevant passages, name any regulation potentially violated>\",\n  \
         \"category\": \"<one category id, or null when not greenwashing>\"\n}}"
    )
}

/// User prompt asking for a [`Rewrite`](crate::report::Rewrite) record.
pub fn rewrite_prompt(statement: &str, analysis: &Analysis) -> String {
    let category = analysis.category.map_or("none", GreenwashingCategory::as_str);
    format!(
        "Original statement: \"{statement}\"\n\n\
         Greenwashing analysis:\n\
         - is_greenwashing: {}\n\
         - category: {category}\n\
         - explanation: {}\n\n\
         Respond with JSON exactly in this form:\n\
         {{\n  \"revised_statement\": \"<rewrite to avoid any misleading claims>\",\n  \
         \"justification\": \"<explain how the rewrite improves honesty>\",\n  \
         \"suggestions\": [\"<2-3 concise, evidence-based edits>\"]\n}}",
        analysis.is_greenwashing, analysis.explanation
    )
}
