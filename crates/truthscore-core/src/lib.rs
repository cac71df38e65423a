//! # truthscore-core
//!
//! Deterministic, verification-gated truth scoring for LLM answers.
//!
//! Given a question and a candidate answer, this crate answers:
//! - Does retrieved evidence support the answer?
//! - Is the answer internally consistent?
//! - Should the answer be returned, qualified, or withheld?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces a bit-identical result
//! 2. **No LLM calls**: All evaluation is heuristic and local
//! 3. **Bounded**: Every score is in [0, 1], never NaN
//! 4. **Parallel-safe**: Evaluators share no state and run independently
//!
//! ## Example
//!
//! ```rust
//! use truthscore_core::{evaluate_truthfulness, Decision};
//!
//! let result = evaluate_truthfulness(
//!     "What did Cleopatra look like?",
//!     "Cleopatra had pale skin, green eyes and long black braided hair.",
//!     None,
//! )?;
//!
//! // No evidence corpus is configured, so the answer cannot be verified.
//! assert_eq!(result.decision, Decision::Refuse);
//! # Ok::<(), truthscore_core::TruthScoreError>(())
//! ```

pub mod aggregator;
pub mod config;
pub mod entailment;
pub mod evaluators;
pub mod gate;
pub mod retrieval;
pub mod text;
pub mod types;

// Re-export main types at crate root
pub use aggregator::{ComponentValues, ScoreAggregator};
pub use config::{ComponentWeights, ConfigError, ScoringConfig};
pub use entailment::{EntailmentChecker, FixedEntailment, LexicalEntailment};
pub use evaluators::{
    ComponentEvaluator, ConsistencyEvaluator, CoverageEvaluator, EvidenceAgreementEvaluator,
    LanguageConfidenceEvaluator, EMPTY_EVIDENCE_PENALTY,
};
pub use gate::DecisionGate;
pub use retrieval::{
    Corpus, Document, KeywordRetriever, Retriever, RetrieverConfig, StaticRetriever,
};
pub use types::{
    ComponentName, ComponentScore, Decision, EvaluationInput, EvidenceSnippet, ScoreDetail,
    TruthScoreResult,
};

use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during evaluation
#[derive(Error, Debug)]
pub enum TruthScoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing component score: {0}")]
    MissingComponent(ComponentName),

    #[error("Component score supplied more than once: {0}")]
    DuplicateComponent(ComponentName),
}

/// Evaluate an answer with the default scorer.
///
/// This is the main entry point. The default scorer uses keyword retrieval
/// over an empty corpus, so evidence-based components take the
/// insufficient-evidence path; build a [`TruthScorer`] with a real
/// [`Retriever`] to verify against evidence.
///
/// # Arguments
///
/// * `question` - The question the answer responds to
/// * `answer` - The LLM-generated answer
/// * `config` - Weights and thresholds; `None` uses [`ScoringConfig::default`]
pub fn evaluate_truthfulness(
    question: &str,
    answer: &str,
    config: Option<&ScoringConfig>,
) -> Result<TruthScoreResult, TruthScoreError> {
    let config = config.cloned().unwrap_or_default();
    TruthScorer::new().with_config(config).evaluate(question, answer)
}

/// A configured scoring pipeline.
///
/// Owns the retrieval and entailment strategies plus an immutable config.
/// Holds no per-call state, so one scorer can serve many threads.
#[derive(Clone)]
pub struct TruthScorer {
    retriever: Arc<dyn Retriever>,
    evidence: EvidenceAgreementEvaluator,
    consistency: ConsistencyEvaluator,
    coverage: CoverageEvaluator,
    language: LanguageConfidenceEvaluator,
    aggregator: ScoreAggregator,
    gate: DecisionGate,
    config: ScoringConfig,
}

impl TruthScorer {
    /// Keyword retrieval over an empty corpus, lexical entailment, default config.
    pub fn new() -> Self {
        Self {
            retriever: Arc::new(KeywordRetriever::default()),
            evidence: EvidenceAgreementEvaluator::default(),
            consistency: ConsistencyEvaluator::new(),
            coverage: CoverageEvaluator::new(),
            language: LanguageConfidenceEvaluator::new(),
            aggregator: ScoreAggregator::new(),
            gate: DecisionGate::new(),
            config: ScoringConfig::default(),
        }
    }

    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = retriever;
        self
    }

    pub fn with_checker(mut self, checker: Arc<dyn EntailmentChecker>) -> Self {
        self.evidence = EvidenceAgreementEvaluator::new(checker);
        self
    }

    pub fn with_config(mut self, config: ScoringConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn retriever(&self) -> &Arc<dyn Retriever> {
        &self.retriever
    }

    /// The evaluator producing `name`.
    pub fn evaluator(&self, name: ComponentName) -> &dyn ComponentEvaluator {
        match name {
            ComponentName::Evidence => &self.evidence,
            ComponentName::Consistency => &self.consistency,
            ComponentName::Coverage => &self.coverage,
            ComponentName::Language => &self.language,
        }
    }

    /// Retrieve evidence for `question`, then score `answer`.
    pub fn evaluate(&self, question: &str, answer: &str) -> Result<TruthScoreResult, TruthScoreError> {
        let evidence = self.retriever.retrieve(question);
        tracing::debug!(
            retriever = self.retriever.name(),
            snippets = evidence.len(),
            "Evidence retrieved"
        );
        self.evaluate_with_evidence(question, answer, &evidence)
    }

    /// Score `answer` against caller-supplied evidence, skipping retrieval.
    pub fn evaluate_with_evidence(
        &self,
        question: &str,
        answer: &str,
        evidence: &[EvidenceSnippet],
    ) -> Result<TruthScoreResult, TruthScoreError> {
        let input = EvaluationInput::new(question, answer, evidence);

        // Fan-out: each evaluator sees the same input and nothing else
        let components = ComponentName::ALL
            .iter()
            .map(|name| self.evaluator(*name).evaluate(&input))
            .collect();

        // Fan-in
        self.finalize(components)
    }

    /// Aggregate component scores and apply the gate.
    ///
    /// Components may arrive in any order; the result lists them in
    /// canonical order.
    pub fn finalize(
        &self,
        mut components: Vec<ComponentScore>,
    ) -> Result<TruthScoreResult, TruthScoreError> {
        let score = self.aggregator.aggregate(&components, &self.config)?;
        let decision = self.gate.decide(score, &self.config);
        components.sort_by_key(|c| c.name);

        tracing::debug!(score, decision = %decision, "Truth score computed");

        Ok(TruthScoreResult {
            score,
            decision,
            components,
            weights_used: *self.config.weights(),
        })
    }
}

impl Default for TruthScorer {
    fn default() -> Self {
        Self::new()
    }
}
