//! Language confidence: hedging versus certainty in the phrasing.
//!
//! Only the internal balance of the answer is scored. A confidently worded
//! answer is not penalized here even when the question is one nobody can
//! answer; that judgement belongs to the evidence-based signals.

use super::ComponentEvaluator;
use crate::text::{certainty_markers, hedge_markers, split_sentences, word_count};
use crate::types::{unit_interval, ComponentName, ComponentScore, EvaluationInput};

/// Stance score of a plain declarative answer with no markers.
pub const NEUTRAL_STANCE: f64 = 0.8;

const CERTAINTY_BONUS: f64 = 0.05;
const CERTAINTY_BONUS_CAP: usize = 4;
const HEDGE_PENALTY: f64 = 0.15;
const MIXED_STANCE_PENALTY: f64 = 0.1;

/// Minimum words for a sentence to count as well formed.
const WELL_FORMED_MIN_WORDS: usize = 3;

/// Scores linguistic certainty.
///
/// ```text
/// stance = 0.8 + 0.05·min(c, 4) − 0.15·h − 0.1·min(h, c)
/// value  = clamp(stance) · (0.8 + 0.2 · well_formed_ratio)
/// ```
///
/// where `h` counts hedges ("maybe", "possibly") and `c` certainty markers
/// ("definitely", "always"). Mixing both in one answer costs extra.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageConfidenceEvaluator;

impl LanguageConfidenceEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Score `answer`.
    pub fn score(&self, answer: &str) -> ComponentScore {
        let sentences = split_sentences(answer);
        if sentences.is_empty() {
            return ComponentScore::new(ComponentName::Language, 0.0)
                .with_detail("empty_answer", true);
        }

        let hedges = hedge_markers(answer);
        let certainties = certainty_markers(answer);
        let h = hedges.len();
        let c = certainties.len();

        let stance = NEUTRAL_STANCE + CERTAINTY_BONUS * c.min(CERTAINTY_BONUS_CAP) as f64
            - HEDGE_PENALTY * h as f64
            - MIXED_STANCE_PENALTY * h.min(c) as f64;

        let well_formed = sentences
            .iter()
            .filter(|s| word_count(s) >= WELL_FORMED_MIN_WORDS)
            .count();
        // A one-sentence answer is well formed by definition.
        let well_formed_ratio = if sentences.len() == 1 {
            1.0
        } else {
            well_formed as f64 / sentences.len() as f64
        };

        let value = unit_interval(stance) * (0.8 + 0.2 * well_formed_ratio);

        tracing::debug!(
            component = ?ComponentName::Language,
            hedges = h,
            certainty = c,
            value,
            "Language confidence scored"
        );

        ComponentScore::new(ComponentName::Language, value)
            .with_detail("hedge_markers", &hedges)
            .with_detail("certainty_markers", &certainties)
            .with_detail("stance", unit_interval(stance))
            .with_detail("well_formed_ratio", well_formed_ratio)
    }
}

impl ComponentEvaluator for LanguageConfidenceEvaluator {
    fn component(&self) -> ComponentName {
        ComponentName::Language
    }

    fn evaluate(&self, input: &EvaluationInput<'_>) -> ComponentScore {
        self.score(input.answer)
    }
}
