//! ScoreAggregator: combines component scores into one truth score.
//!
//! The aggregation is fixed:
//! 1. Exactly one score per component, or the call fails
//! 2. `raw = Σ weight[c] · value[c]`
//! 3. `score = 1 / (1 + e^(−k·(raw − 0.5)))` with `k = sigmoid_steepness`
//! 4. Clamp into [0, 1]
//!
//! With non-negative weights and `k > 0` every step is non-decreasing in
//! each component value, so the whole aggregation is monotone.

use crate::config::ScoringConfig;
use crate::types::{ComponentName, ComponentScore};
use crate::TruthScoreError;

/// Midpoint of the sigmoid on the raw weighted-sum axis.
pub const SIGMOID_CENTER: f64 = 0.5;

/// The four component values, one per name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentValues {
    pub evidence: f64,
    pub consistency: f64,
    pub coverage: f64,
    pub language: f64,
}

impl ComponentValues {
    fn get(&self, name: ComponentName) -> f64 {
        match name {
            ComponentName::Evidence => self.evidence,
            ComponentName::Consistency => self.consistency,
            ComponentName::Coverage => self.coverage,
            ComponentName::Language => self.language,
        }
    }

    /// Pick out one value per component, rejecting gaps and repeats.
    pub fn from_scores(scores: &[ComponentScore]) -> Result<Self, TruthScoreError> {
        let mut slots: [Option<f64>; 4] = [None; 4];

        for score in scores {
            let slot = &mut slots[Self::slot(score.name)];
            if slot.is_some() {
                return Err(TruthScoreError::DuplicateComponent(score.name));
            }
            *slot = Some(score.value);
        }

        let value = |name: ComponentName| {
            slots[Self::slot(name)].ok_or(TruthScoreError::MissingComponent(name))
        };

        Ok(Self {
            evidence: value(ComponentName::Evidence)?,
            consistency: value(ComponentName::Consistency)?,
            coverage: value(ComponentName::Coverage)?,
            language: value(ComponentName::Language)?,
        })
    }

    fn slot(name: ComponentName) -> usize {
        match name {
            ComponentName::Evidence => 0,
            ComponentName::Consistency => 1,
            ComponentName::Coverage => 2,
            ComponentName::Language => 3,
        }
    }
}

/// The ScoreAggregator applies weights and sigmoid normalization.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreAggregator;

impl ScoreAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate component scores into a truth score.
    ///
    /// Fails with [`TruthScoreError::MissingComponent`] when a component is
    /// absent and [`TruthScoreError::DuplicateComponent`] when one repeats.
    pub fn aggregate(
        &self,
        components: &[ComponentScore],
        config: &ScoringConfig,
    ) -> Result<f64, TruthScoreError> {
        let values = ComponentValues::from_scores(components)?;
        Ok(self.aggregate_values(&values, config))
    }

    /// Aggregate already-validated component values.
    pub fn aggregate_values(&self, values: &ComponentValues, config: &ScoringConfig) -> f64 {
        let raw = self.weighted_sum(values, config);
        let score = self.normalize(raw, config.sigmoid_steepness());

        tracing::debug!(raw, score, "Aggregated component scores");
        score
    }

    /// `Σ weight[c] · value[c]` over the four components.
    pub fn weighted_sum(&self, values: &ComponentValues, config: &ScoringConfig) -> f64 {
        config
            .weights()
            .iter()
            .map(|(name, weight)| weight * clamp_value(values.get(name)))
            .sum()
    }

    /// Sigmoid around [`SIGMOID_CENTER`], clamped into [0, 1].
    pub fn normalize(&self, raw: f64, steepness: f64) -> f64 {
        let score = 1.0 / (1.0 + (-steepness * (raw - SIGMOID_CENTER)).exp());
        if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        }
    }
}

fn clamp_value(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
