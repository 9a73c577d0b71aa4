//! Greenwashing categories a misleading claim can fall into.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of misleading sustainability claim.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GreenwashingCategory {
    /// Vague, metric-free language.
    AmbiguousClaims,
    /// Only one eco aspect highlighted.
    HiddenTradeOffs,
    /// Misleading imagery.
    VisualDeception,
    /// Incorrect or unverified numbers.
    MisleadingMetrics,
    /// Commitments without a real plan.
    EmptyPromises,
    /// Fake or non-verified labels.
    UnverifiedCertifications,
    /// Framing legal duty as a choice.
    ComplianceAsLeadership,
}

impl GreenwashingCategory {
    /// Every category, in presentation order.
    pub const ALL: [Self; 7] = [
        Self::AmbiguousClaims,
        Self::HiddenTradeOffs,
        Self::VisualDeception,
        Self::MisleadingMetrics,
        Self::EmptyPromises,
        Self::UnverifiedCertifications,
        Self::ComplianceAsLeadership,
    ];

    /// The identifier used in model output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AmbiguousClaims => "ambiguous_claims",
            Self::HiddenTradeOffs => "hidden_trade_offs",
            Self::VisualDeception => "visual_deception",
            Self::MisleadingMetrics => "misleading_metrics",
            Self::EmptyPromises => "empty_promises",
            Self::UnverifiedCertifications => "unverified_certifications",
            Self::ComplianceAsLeadership => "compliance_as_leadership",
        }
    }

    /// A one-line definition included in the judging prompt.
    pub fn description(self) -> &'static str {
        match self {
            Self::AmbiguousClaims => "Vague, metric-free language.",
            Self::HiddenTradeOffs => "Only one eco aspect highlighted.",
            Self::VisualDeception => "Misleading imagery.",
            Self::MisleadingMetrics => "Incorrect or unverified numbers.",
            Self::EmptyPromises => "Commitments without a real plan.",
            Self::UnverifiedCertifications => "Fake or non-verified labels.",
            Self::ComplianceAsLeadership => "Framing legal duty as a choice.",
        }
    }
}

impl fmt::Display for GreenwashingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_names_match_as_str() {
        for category in GreenwashingCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }
}
