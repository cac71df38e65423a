//! Coverage: how much of the answer does the evidence address?

use std::collections::BTreeSet;

use super::{empty_evidence_score, ComponentEvaluator};
use crate::text::{content_terms, term_supported};
use crate::types::{ComponentName, ComponentScore, EvaluationInput, EvidenceSnippet};

/// Share of the answer's claim terms that appear in the evidence.
///
/// A term counts as covered when it, or a term sharing its first five
/// characters, occurs in any snippet.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverageEvaluator;

impl CoverageEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Score `answer` against `evidence`.
    pub fn score(&self, answer: &str, evidence: &[EvidenceSnippet]) -> ComponentScore {
        if evidence.is_empty() {
            return empty_evidence_score(ComponentName::Coverage);
        }

        let claim_terms = content_terms(answer);
        if claim_terms.is_empty() {
            return ComponentScore::new(ComponentName::Coverage, 0.0)
                .with_detail("snippet_count", evidence.len())
                .with_detail("claim_terms", 0);
        }

        let evidence_terms: BTreeSet<String> = evidence
            .iter()
            .flat_map(|snippet| content_terms(&snippet.text))
            .collect();

        let (covered, uncovered): (Vec<&String>, Vec<&String>) = claim_terms
            .iter()
            .partition(|term| term_supported(term, &evidence_terms));

        let value = covered.len() as f64 / claim_terms.len() as f64;

        tracing::debug!(
            component = ?ComponentName::Coverage,
            claim_terms = claim_terms.len(),
            covered = covered.len(),
            value,
            "Coverage scored"
        );

        ComponentScore::new(ComponentName::Coverage, value)
            .with_detail("snippet_count", evidence.len())
            .with_detail("claim_terms", claim_terms.len())
            .with_detail("covered", &covered)
            .with_detail("uncovered", &uncovered)
    }
}

impl ComponentEvaluator for CoverageEvaluator {
    fn component(&self) -> ComponentName {
        ComponentName::Coverage
    }

    fn evaluate(&self, input: &EvaluationInput<'_>) -> ComponentScore {
        self.score(input.answer, input.evidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluators::EMPTY_EVIDENCE_PENALTY;

    #[test]
    fn test_empty_evidence_penalty() {
        let score = CoverageEvaluator::new().score("Cleopatra had green eyes.", &[]);
        assert_eq!(score.value, EMPTY_EVIDENCE_PENALTY);
    }

    #[test]
    fn test_full_coverage() {
        let evidence = vec![EvidenceSnippet::new(
            "Water boils at 100 degrees Celsius at sea level.",
            "s1",
            0.9,
        )];
        let score = CoverageEvaluator::new().score("Water boils at 100°C at sea level.", &evidence);
        assert_eq!(score.value, 1.0);
    }

    #[test]
    fn test_partial_coverage_lists_uncovered() {
        let evidence = vec![EvidenceSnippet::new("Paris is the capital of France.", "s1", 0.9)];
        let score = CoverageEvaluator::new().score(
            "Paris is the capital of France and famous for croissants.",
            &evidence,
        );
        assert!((score.value - 0.6).abs() < 1e-12);
        let uncovered = score.detail["uncovered"].as_array().unwrap();
        assert!(uncovered.contains(&serde_json::json!("croissant")));
    }

    #[test]
    fn test_union_of_snippets() {
        let evidence = vec![
            EvidenceSnippet::new("Paris is the capital of France.", "s1", 0.9),
            EvidenceSnippet::new("Croissants are famous French pastries.", "s2", 0.4),
        ];
        let score = CoverageEvaluator::new().score(
            "Paris is the capital of France and famous for croissants.",
            &evidence,
        );
        assert_eq!(score.value, 1.0);
    }

    #[test]
    fn test_no_claim_terms() {
        let evidence = vec![EvidenceSnippet::new("Anything.", "s1", 0.9)];
        assert_eq!(CoverageEvaluator::new().score("Yes.", &evidence).value, 0.0);
    }
}
