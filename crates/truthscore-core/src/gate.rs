//! DecisionGate: maps a truth score to ACCEPT / QUALIFIED / REFUSE.
//!
//! | Range | Decision |
//! |-------|----------|
//! | `score ≥ accept_threshold` | ACCEPT |
//! | `qualified_threshold ≤ score < accept_threshold` | QUALIFIED |
//! | `score < qualified_threshold` | REFUSE |
//!
//! Boundaries belong to the higher bucket. The buckets partition [0, 1]:
//! every score lands in exactly one. A NaN score is refused.

use crate::config::ScoringConfig;
use crate::types::Decision;

/// Deterministic threshold gate. Thresholds are validated when the
/// `ScoringConfig` is built, so deciding cannot fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionGate;

impl DecisionGate {
    pub fn new() -> Self {
        Self
    }

    pub fn decide(&self, score: f64, config: &ScoringConfig) -> Decision {
        if score >= config.accept_threshold() {
            Decision::Accept
        } else if score >= config.qualified_threshold() {
            Decision::Qualified
        } else {
            Decision::Refuse
        }
    }
}
