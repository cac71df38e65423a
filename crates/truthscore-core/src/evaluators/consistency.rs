//! Self-consistency: does the answer contradict itself?
//!
//! Signals, each counted once per occurrence:
//!
//! | Signal | Kind | Detection |
//! |--------|------|-----------|
//! | contradiction pair | contradiction | two sentences about the same terms with opposite polarity |
//! | stance reversal | contradiction | "yes and no", "is and is not", ... |
//! | fragment | structural | sentence under 3 words in a multi-sentence answer |
//! | run-on | structural | sentence over 60 words |
//!
//! `value = 0.6^contradictions · 0.9^structural`, so a clean answer scores
//! 1.0 and every additional signal strictly lowers the score.

use serde::Serialize;
use std::collections::BTreeSet;

use super::ComponentEvaluator;
use crate::text::{content_terms, is_negated, split_sentences, stance_reversals, word_count};
use crate::types::{ComponentName, ComponentScore, EvaluationInput};

/// Multiplier per contradiction signal.
pub const CONTRADICTION_DECAY: f64 = 0.6;

/// Multiplier per structural signal.
pub const STRUCTURAL_DECAY: f64 = 0.9;

const FRAGMENT_MAX_WORDS: usize = 2;
const RUN_ON_MIN_WORDS: usize = 61;
const PAIR_MIN_SHARED_TERMS: usize = 2;
const PAIR_MIN_JACCARD: f64 = 0.5;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Signal {
    ContradictionPair { first: usize, second: usize },
    StanceReversal { pattern: &'static str, sentence: usize },
    Fragment { sentence: usize },
    RunOn { sentence: usize },
}

impl Signal {
    fn is_contradiction(&self) -> bool {
        matches!(
            self,
            Signal::ContradictionPair { .. } | Signal::StanceReversal { .. }
        )
    }
}

struct Sentence {
    terms: BTreeSet<String>,
    negated: bool,
    words: usize,
}

/// Scores internal coherence of the answer text. Never reads evidence.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyEvaluator;

impl ConsistencyEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Score `answer`.
    pub fn score(&self, answer: &str) -> ComponentScore {
        let raw_sentences = split_sentences(answer);
        if raw_sentences.is_empty() {
            return ComponentScore::new(ComponentName::Consistency, 0.0)
                .with_detail("empty_answer", true);
        }

        let sentences: Vec<Sentence> = raw_sentences
            .iter()
            .map(|s| Sentence {
                terms: content_terms(s),
                negated: is_negated(s),
                words: word_count(s),
            })
            .collect();

        let mut signals = Vec::new();
        signals.extend(self.contradiction_pairs(&sentences));

        for (index, text) in raw_sentences.iter().enumerate() {
            for (pattern, _, _) in stance_reversals(text) {
                signals.push(Signal::StanceReversal {
                    pattern,
                    sentence: index,
                });
            }
        }

        signals.extend(self.structural_signals(&sentences));

        let contradictions = signals.iter().filter(|s| s.is_contradiction()).count();
        let structural = signals.len() - contradictions;

        let value = CONTRADICTION_DECAY.powi(contradictions as i32)
            * STRUCTURAL_DECAY.powi(structural as i32);

        tracing::debug!(
            component = ?ComponentName::Consistency,
            contradictions,
            structural,
            value,
            "Consistency scored"
        );

        ComponentScore::new(ComponentName::Consistency, value)
            .with_detail("sentence_count", sentences.len())
            .with_detail("contradiction_signals", contradictions)
            .with_detail("structural_signals", structural)
            .with_detail("signals", &signals)
    }

    /// Sentence pairs that talk about the same thing with opposite polarity.
    fn contradiction_pairs(&self, sentences: &[Sentence]) -> Vec<Signal> {
        let mut pairs = Vec::new();

        for (i, first) in sentences.iter().enumerate() {
            for (offset, second) in sentences[i + 1..].iter().enumerate() {
                if first.negated == second.negated {
                    continue;
                }

                let shared = first.terms.intersection(&second.terms).count();
                if shared < PAIR_MIN_SHARED_TERMS {
                    continue;
                }

                let union = first.terms.union(&second.terms).count();
                let jaccard = shared as f64 / union as f64;
                if jaccard >= PAIR_MIN_JACCARD {
                    pairs.push(Signal::ContradictionPair {
                        first: i,
                        second: i + 1 + offset,
                    });
                }
            }
        }

        pairs
    }

    fn structural_signals(&self, sentences: &[Sentence]) -> Vec<Signal> {
        let multi_sentence = sentences.len() > 1;

        sentences
            .iter()
            .enumerate()
            .filter_map(|(index, sentence)| {
                if multi_sentence && sentence.words <= FRAGMENT_MAX_WORDS {
                    Some(Signal::Fragment { sentence: index })
                } else if sentence.words >= RUN_ON_MIN_WORDS {
                    Some(Signal::RunOn { sentence: index })
                } else {
                    None
                }
            })
            .collect()
    }
}

impl ComponentEvaluator for ConsistencyEvaluator {
    fn component(&self) -> ComponentName {
        ComponentName::Consistency
    }

    fn evaluate(&self, input: &EvaluationInput<'_>) -> ComponentScore {
        self.score(input.answer)
    }
}
