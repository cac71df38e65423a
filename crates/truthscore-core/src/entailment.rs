//! Entailment checking between an answer and a piece of evidence.

use crate::text::{content_terms, is_negated, term_supported};
use crate::types::{unit_interval, EvidenceSnippet};

/// Capability: how strongly does a snippet support an answer?
///
/// Implementations must be pure: the same inputs always give the same
/// score, in [0, 1], higher meaning stronger entailment.
pub trait EntailmentChecker: Send + Sync {
    fn name(&self) -> &str;

    fn check(&self, answer: &str, snippet: &EvidenceSnippet) -> f64;
}

/// Factor applied when exactly one side is negated.
pub const POLARITY_MISMATCH_FACTOR: f64 = 0.2;

/// Lexical-overlap entailment.
///
/// Score is the share of the answer's claim terms found in the snippet,
/// scaled down by [`POLARITY_MISMATCH_FACTOR`] when the answer and the
/// snippet disagree in polarity ("does not prevent" vs "prevents").
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalEntailment;

impl LexicalEntailment {
    pub fn new() -> Self {
        Self
    }
}

impl EntailmentChecker for LexicalEntailment {
    fn name(&self) -> &str {
        "lexical"
    }

    fn check(&self, answer: &str, snippet: &EvidenceSnippet) -> f64 {
        let answer_terms = content_terms(answer);
        if answer_terms.is_empty() {
            return 0.0;
        }

        let snippet_terms = content_terms(&snippet.text);
        let supported = answer_terms
            .iter()
            .filter(|term| term_supported(term, &snippet_terms))
            .count();

        let mut score = supported as f64 / answer_terms.len() as f64;

        if is_negated(answer) != is_negated(&snippet.text) {
            score *= POLARITY_MISMATCH_FACTOR;
        }

        unit_interval(score)
    }
}

/// Always returns the same score. Useful for tests and for pinning
/// one signal while exploring the others.
#[derive(Debug, Clone, Copy)]
pub struct FixedEntailment(pub f64);

impl EntailmentChecker for FixedEntailment {
    fn name(&self) -> &str {
        "fixed"
    }

    fn check(&self, _answer: &str, _snippet: &EvidenceSnippet) -> f64 {
        unit_interval(self.0)
    }
}
