//! Verification-gated answering.
//!
//! A [`GatedResponder`] asks an [`AnswerGenerator`] for an answer, scores it,
//! and withholds it behind a fixed refusal when the gate says REFUSE.
//! QUALIFIED answers pass through; presenting the qualification is the
//! caller's job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use truthscore_core::{Decision, TruthScoreResult};

use crate::orchestrator::{RetrievalStatus, RuntimeError, RuntimeOrchestrator};

/// Returned in place of an answer that failed verification.
pub const REFUSAL_MESSAGE: &str =
    "I cannot provide a confident answer to this question based on available evidence.";

/// Label reported for gated answers.
pub const GATED_METHOD: &str = "truthscore";

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generator {generator} failed: {message}")]
    Failed { generator: String, message: String },

    #[error("Generator {0} returned an empty answer")]
    EmptyAnswer(String),
}

/// An answer produced by some upstream inference method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedAnswer {
    pub text: String,
    /// e.g. "vanilla", "rag", "self_consistency"
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Anything that turns a question into a candidate answer.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, question: &str) -> Result<GeneratedAnswer, GenerationError>;
}

/// Outcome of a gated call.
#[derive(Debug, Clone, Serialize)]
pub struct GatedAnswer {
    /// What the user sees: the answer, or the refusal message
    pub text: String,
    pub original_answer: String,
    pub method: &'static str,
    pub base_method: String,
    pub decision: Decision,
    pub truth_score: f64,
    pub refused: bool,
    pub retrieval: RetrievalStatus,
    pub score_details: TruthScoreResult,
}

/// Generates, scores and gates answers.
pub struct GatedResponder {
    generator: Arc<dyn AnswerGenerator>,
    orchestrator: Arc<RuntimeOrchestrator>,
    refusal_message: String,
}

impl GatedResponder {
    pub fn new(generator: Arc<dyn AnswerGenerator>, orchestrator: Arc<RuntimeOrchestrator>) -> Self {
        Self {
            generator,
            orchestrator,
            refusal_message: REFUSAL_MESSAGE.to_string(),
        }
    }

    pub fn with_refusal_message(mut self, message: impl Into<String>) -> Self {
        self.refusal_message = message.into();
        self
    }

    pub async fn respond(&self, question: &str) -> Result<GatedAnswer, RuntimeError> {
        let generated = self.generator.generate(question).await?;
        if generated.text.trim().is_empty() {
            return Err(GenerationError::EmptyAnswer(self.generator.name().to_string()).into());
        }

        let result = self.orchestrator.evaluate(question, &generated.text).await?;
        let evaluation = result.evaluation;
        let refused = evaluation.decision.is_refuse();

        tracing::info!(
            generator = self.generator.name(),
            base_method = %generated.method,
            score = evaluation.score,
            decision = %evaluation.decision,
            refused,
            "Gated answer"
        );

        let text = if refused {
            self.refusal_message.clone()
        } else {
            generated.text.clone()
        };

        Ok(GatedAnswer {
            text,
            original_answer: generated.text,
            method: GATED_METHOD,
            base_method: generated.method,
            decision: evaluation.decision,
            truth_score: evaluation.score,
            refused,
            retrieval: result.retrieval,
            score_details: evaluation,
        })
    }
}
