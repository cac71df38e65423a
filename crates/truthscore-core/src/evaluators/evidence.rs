//! Evidence agreement: relevance-weighted entailment.

use serde::Serialize;
use std::sync::Arc;

use super::{empty_evidence_score, ComponentEvaluator};
use crate::entailment::{EntailmentChecker, LexicalEntailment};
use crate::types::{unit_interval, ComponentName, ComponentScore, EvaluationInput, EvidenceSnippet};

/// Total relevance below this is treated as "no weighting information".
const MIN_TOTAL_RELEVANCE: f64 = 1e-12;

#[derive(Debug, Serialize)]
struct SnippetEntailment<'a> {
    source_id: &'a str,
    relevance: f64,
    entailment: f64,
}

/// Aggregates entailment across all retrieved snippets.
///
/// `value = Σ relevanceᵢ · entailmentᵢ / Σ relevanceᵢ`. When every snippet
/// has zero relevance the plain mean is used instead. Relevance is clamped
/// into [0, 1] here as well, since snippets can be built field by field.
#[derive(Clone)]
pub struct EvidenceAgreementEvaluator {
    checker: Arc<dyn EntailmentChecker>,
}

impl EvidenceAgreementEvaluator {
    pub fn new(checker: Arc<dyn EntailmentChecker>) -> Self {
        Self { checker }
    }

    /// Score `answer` against `evidence`.
    pub fn score(&self, answer: &str, evidence: &[EvidenceSnippet]) -> ComponentScore {
        if evidence.is_empty() {
            return empty_evidence_score(ComponentName::Evidence);
        }

        let per_snippet: Vec<SnippetEntailment<'_>> = evidence
            .iter()
            .map(|snippet| SnippetEntailment {
                source_id: &snippet.source_id,
                relevance: unit_interval(snippet.relevance),
                entailment: unit_interval(self.checker.check(answer, snippet)),
            })
            .collect();

        let total_relevance: f64 = per_snippet.iter().map(|s| s.relevance).sum();

        let (value, weighting) = if total_relevance > MIN_TOTAL_RELEVANCE {
            let weighted: f64 = per_snippet.iter().map(|s| s.relevance * s.entailment).sum();
            (weighted / total_relevance, "relevance")
        } else {
            let sum: f64 = per_snippet.iter().map(|s| s.entailment).sum();
            (sum / per_snippet.len() as f64, "uniform")
        };

        tracing::debug!(
            component = ?ComponentName::Evidence,
            checker = self.checker.name(),
            snippets = per_snippet.len(),
            value,
            "Evidence agreement scored"
        );

        ComponentScore::new(ComponentName::Evidence, value)
            .with_detail("snippet_count", per_snippet.len())
            .with_detail("weighting", weighting)
            .with_detail("checker", self.checker.name())
            .with_detail("per_snippet", &per_snippet)
    }
}

impl Default for EvidenceAgreementEvaluator {
    fn default() -> Self {
        Self::new(Arc::new(LexicalEntailment::new()))
    }
}

impl ComponentEvaluator for EvidenceAgreementEvaluator {
    fn component(&self) -> ComponentName {
        ComponentName::Evidence
    }

    fn evaluate(&self, input: &EvaluationInput<'_>) -> ComponentScore {
        self.score(input.answer, input.evidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entailment::FixedEntailment;
    use crate::evaluators::EMPTY_EVIDENCE_PENALTY;

    /// Entailment equal to the snippet's source id parsed as a number.
    struct ById;

    impl EntailmentChecker for ById {
        fn name(&self) -> &str {
            "by-id"
        }

        fn check(&self, _answer: &str, snippet: &EvidenceSnippet) -> f64 {
            snippet.source_id.parse().unwrap_or(0.0)
        }
    }

    #[test]
    fn test_empty_evidence_penalty() {
        let evaluator = EvidenceAgreementEvaluator::default();
        let score = evaluator.score("Cleopatra had green eyes.", &[]);
        assert_eq!(score.value, EMPTY_EVIDENCE_PENALTY);
        assert_eq!(score.detail["insufficient_evidence"], serde_json::json!(true));
    }

    #[test]
    fn test_relevance_weighted_mean() {
        let evaluator = EvidenceAgreementEvaluator::new(Arc::new(ById));
        let evidence = vec![
            EvidenceSnippet::new("a", "1.0", 0.75),
            EvidenceSnippet::new("b", "0.0", 0.25),
        ];
        let score = evaluator.score("answer", &evidence);
        assert!((score.value - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_zero_relevance_falls_back_to_mean() {
        let evaluator = EvidenceAgreementEvaluator::new(Arc::new(ById));
        let evidence = vec![
            EvidenceSnippet::new("a", "1.0", 0.0),
            EvidenceSnippet::new("b", "0.0", 0.0),
        ];
        let score = evaluator.score("answer", &evidence);
        assert!((score.value - 0.5).abs() < 1e-12);
        assert_eq!(score.detail["weighting"], serde_json::json!("uniform"));
    }

    #[test]
    fn test_out_of_range_relevance_clamped() {
        let evaluator = EvidenceAgreementEvaluator::new(Arc::new(ById));
        let baseline = evaluator.score("answer", &[EvidenceSnippet::new("a", "0.5", 1.0)]);
        assert!((baseline.value - 0.5).abs() < 1e-12);

        // Negative relevance carries no weight instead of inverting it
        let mut negative = EvidenceSnippet::new("b", "0.0", 0.0);
        negative.relevance = -0.5;
        let score = evaluator.score(
            "answer",
            &[EvidenceSnippet::new("a", "0.5", 1.0), negative],
        );
        assert!((score.value - 0.5).abs() < 1e-12);

        // Relevance above 1 weighs the same as 1
        let mut oversized = EvidenceSnippet::new("c", "0.0", 0.0);
        oversized.relevance = 4.0;
        let score = evaluator.score(
            "answer",
            &[EvidenceSnippet::new("a", "1.0", 1.0), oversized],
        );
        assert!((score.value - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_strong_evidence() {
        let evaluator = EvidenceAgreementEvaluator::new(Arc::new(FixedEntailment(0.9)));
        let evidence = vec![
            EvidenceSnippet::new("Water boils at 100°C at sea level.", "s1", 0.9),
            EvidenceSnippet::new("At one atmosphere water boils at 100°C.", "s2", 0.9),
        ];
        let score = evaluator.score("True, water boils at 100°C at sea level.", &evidence);
        assert!((score.value - 0.9).abs() < 1e-12);
        assert_eq!(score.detail["snippet_count"], serde_json::json!(2));
    }

    #[test]
    fn test_per_snippet_detail_recorded() {
        let evaluator = EvidenceAgreementEvaluator::default();
        let evidence = vec![EvidenceSnippet::new("Paris is the capital of France.", "wiki", 0.8)];
        let score = evaluator.score("Paris is the capital of France.", &evidence);
        let per_snippet = score.detail["per_snippet"].as_array().unwrap();
        assert_eq!(per_snippet[0]["source_id"], serde_json::json!("wiki"));
        assert_eq!(score.value, 1.0);
    }
}
