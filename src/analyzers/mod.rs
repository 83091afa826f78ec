pub mod email_header;
pub mod obfuscation;
pub mod password_generator;
pub mod password_strength;
pub mod redirect;

pub use email_header::{HeaderAnalysis, HeaderRiskAnalyzer};
pub use obfuscation::{ObfuscationHunter, ObfuscationReport};
pub use password_generator::{CharacterSets, GeneratedPassword, PasswordGenerator};
pub use password_strength::{PasswordAssessment, PasswordStrengthEstimator};
pub use redirect::{RedirectAnalyzer, RedirectAssessment};

use crate::error::AnalyzerError;

/// One stateless text analyzer: a single input string in, one report out.
pub trait Analyzer: Send + Sync {
    type Report;

    fn analyze(&self, input: &str) -> Result<Self::Report, AnalyzerError>;
    fn name(&self) -> &str;
}

/// A single contribution to a weighted score.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub points: f64,
    pub reason: String,
}

impl Finding {
    pub fn new(points: f64, reason: impl Into<String>) -> Self {
        Self {
            points,
            reason: reason.into(),
        }
    }
}

/// A named entry in a scoring table. `check` inspects the extracted signals
/// and returns a finding when the rule applies.
pub struct ScoringRule<S, C> {
    pub name: &'static str,
    pub check: fn(&S, &C) -> Option<Finding>,
}

/// Run every rule in order, returning the raw (unclamped) sum and the
/// findings that fired.
pub fn apply_rules<S, C>(rules: &[ScoringRule<S, C>], signals: &S, config: &C) -> (f64, Vec<Finding>) {
    let mut total = 0.0;
    let mut findings = Vec::new();

    for rule in rules {
        if let Some(finding) = (rule.check)(signals, config) {
            log::debug!(
                "rule '{}' fired: {:+} ({})",
                rule.name,
                finding.points,
                finding.reason
            );
            total += finding.points;
            findings.push(finding);
        }
    }

    (total, findings)
}
