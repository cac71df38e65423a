//! Core types for TruthScore evaluation.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::ComponentWeights;

/// The four signals that feed the aggregator.
///
/// The declaration order is the canonical order used for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentName {
    /// Entailment of the answer by retrieved evidence
    Evidence,
    /// Internal logical coherence of the answer
    Consistency,
    /// Share of the answer's claims touched by evidence
    Coverage,
    /// Linguistic certainty of the phrasing
    Language,
}

impl ComponentName {
    /// All components in canonical order.
    pub const ALL: [ComponentName; 4] = [
        ComponentName::Evidence,
        ComponentName::Consistency,
        ComponentName::Coverage,
        ComponentName::Language,
    ];

    /// Lower-case identifier, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentName::Evidence => "evidence",
            ComponentName::Consistency => "consistency",
            ComponentName::Coverage => "coverage",
            ComponentName::Language => "language",
        }
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A piece of retrieved evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSnippet {
    /// Snippet text
    pub text: String,

    /// Identifier of the document the snippet came from
    pub source_id: String,

    /// Relevance to the question, in [0, 1]
    #[serde(deserialize_with = "deserialize_relevance")]
    pub relevance: f64,
}

fn deserialize_relevance<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(unit_interval)
}

impl EvidenceSnippet {
    /// Create a snippet. Relevance is clamped into [0, 1]; non-finite becomes 0.
    pub fn new(text: impl Into<String>, source_id: impl Into<String>, relevance: f64) -> Self {
        Self {
            text: text.into(),
            source_id: source_id.into(),
            relevance: unit_interval(relevance),
        }
    }
}

/// Diagnostic sub-signals attached to a component score.
pub type ScoreDetail = BTreeMap<String, serde_json::Value>;

/// The output of one component evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    /// Which component produced this score
    pub name: ComponentName,

    /// Score in [0, 1]
    pub value: f64,

    /// Diagnostics for explainability; never read by aggregation
    #[serde(default)]
    pub detail: ScoreDetail,
}

impl ComponentScore {
    /// Create a score with no detail. Value is clamped into [0, 1]; NaN becomes 0.
    pub fn new(name: ComponentName, value: f64) -> Self {
        Self {
            name,
            value: unit_interval(value),
            detail: ScoreDetail::new(),
        }
    }

    /// Attach a diagnostic entry.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
        self.detail.insert(key.into(), value);
        self
    }
}

/// Final gate outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// Answer may be returned as-is
    Accept,
    /// Answer may be returned with a qualification
    Qualified,
    /// Answer should be withheld
    Refuse,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Accept => "ACCEPT",
            Decision::Qualified => "QUALIFIED",
            Decision::Refuse => "REFUSE",
        }
    }

    pub fn is_refuse(&self) -> bool {
        matches!(self, Decision::Refuse)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of evaluating one answer.
///
/// Carries no timestamp: identical inputs produce identical results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthScoreResult {
    /// Aggregated truth score in [0, 1]
    pub score: f64,

    /// Gate decision for `score`
    pub decision: Decision,

    /// Component scores in canonical order
    pub components: Vec<ComponentScore>,

    /// Weights the aggregator applied
    pub weights_used: ComponentWeights,
}

impl TruthScoreResult {
    /// Look up a component score by name.
    pub fn component(&self, name: ComponentName) -> Option<&ComponentScore> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Value of a component, if present.
    pub fn component_value(&self, name: ComponentName) -> Option<f64> {
        self.component(name).map(|c| c.value)
    }
}

/// Everything a component evaluator may look at.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationInput<'a> {
    pub question: &'a str,
    pub answer: &'a str,
    pub evidence: &'a [EvidenceSnippet],
}

impl<'a> EvaluationInput<'a> {
    pub fn new(question: &'a str, answer: &'a str, evidence: &'a [EvidenceSnippet]) -> Self {
        Self {
            question,
            answer,
            evidence,
        }
    }
}

/// Clamp into [0, 1], mapping NaN to 0.
pub(crate) fn unit_interval(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
