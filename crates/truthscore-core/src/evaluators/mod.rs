//! The four component evaluators.
//!
//! Each evaluator answers one question about an answer:
//!
//! | Evaluator | Question | Reads evidence |
//! |-----------|----------|----------------|
//! | [`EvidenceAgreementEvaluator`] | Does the evidence entail the answer? | yes |
//! | [`ConsistencyEvaluator`] | Does the answer contradict itself? | no |
//! | [`CoverageEvaluator`] | How much of the answer does the evidence touch? | yes |
//! | [`LanguageConfidenceEvaluator`] | Is the phrasing balanced and certain? | no |
//!
//! Evaluators share no state and can run in any order or concurrently.

mod consistency;
mod coverage;
mod evidence;
mod language;

pub use consistency::ConsistencyEvaluator;
pub use coverage::CoverageEvaluator;
pub use evidence::EvidenceAgreementEvaluator;
pub use language::LanguageConfidenceEvaluator;

use crate::types::{ComponentName, ComponentScore, EvaluationInput};

/// Score given by the evidence-based evaluators when retrieval found nothing.
///
/// A fixed "insufficient evidence" penalty, not an error.
pub const EMPTY_EVIDENCE_PENALTY: f64 = 0.3;

/// A component evaluator.
pub trait ComponentEvaluator: Send + Sync {
    /// The component this evaluator produces.
    fn component(&self) -> ComponentName;

    /// Score the answer.
    fn evaluate(&self, input: &EvaluationInput<'_>) -> ComponentScore;
}

/// Score for the empty-evidence path, shared by evidence and coverage.
pub(crate) fn empty_evidence_score(name: ComponentName) -> ComponentScore {
    ComponentScore::new(name, EMPTY_EVIDENCE_PENALTY)
        .with_detail("snippet_count", 0)
        .with_detail("insufficient_evidence", true)
}
