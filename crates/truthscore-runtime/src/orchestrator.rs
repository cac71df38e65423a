//! Runtime orchestrator for concurrent answer evaluation.
//!
//! The orchestrator wraps a [`TruthScorer`] with:
//! - Async retrieval under a timeout, retried with exponential backoff
//! - A circuit breaker that skips a failing retriever
//! - Fallback to the empty-evidence path when retrieval fails
//! - Concurrent fan-out to all 4 evaluators via tokio::join!
//! - Deterministic fan-in through the core aggregator and gate

use backon::Retryable;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use thiserror::Error;

use truthscore_core::{
    ComponentEvaluator, ComponentName, ComponentScore, EvaluationInput, EvidenceSnippet,
    TruthScoreError, TruthScoreResult, TruthScorer,
};

use crate::cache::{CacheKey, CachedEvaluation, EvaluationCache};
use crate::config::RuntimeConfig;
use crate::gating::GenerationError;
use crate::resilience::{CircuitBreaker, CircuitState};
use crate::retrieval::{AsyncRetriever, BlockingRetriever, RetrievalError};

/// Errors from the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Scoring failed: {0}")]
    Scoring(#[from] TruthScoreError),

    #[error("Answer generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Invalid runtime config: {0}")]
    InvalidConfig(String),

    #[error("Failed to read runtime config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse runtime config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// How the evidence for an evaluation was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RetrievalStatus {
    /// The retriever answered, possibly after retries.
    Retrieved { snippets: usize, attempts: u32 },

    /// Retrieval failed or was skipped by the circuit breaker; the answer
    /// was scored without evidence.
    Fallback { reason: String },

    /// Evidence was supplied by the caller.
    Provided { snippets: usize },
}

impl RetrievalStatus {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Result from runtime evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeResult {
    /// The evaluation result
    pub evaluation: TruthScoreResult,

    /// How evidence was obtained
    pub retrieval: RetrievalStatus,

    /// Whether the result came from the cache
    pub cached: bool,
}

/// One question/answer pair of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    pub question: String,
    pub answer: String,
}

impl BatchItem {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// The runtime orchestrator manages resilient, concurrent evaluation.
///
/// # Architecture
/// - Retrieval: timeout per attempt, retry on transient errors, circuit breaker
/// - Fallback: on retrieval failure, score with an empty evidence set
/// - Fan-out: the 4 evaluators execute concurrently via tokio::join!
/// - Fan-in: aggregation and gating exactly as in `truthscore-core`
pub struct RuntimeOrchestrator {
    retriever: Arc<dyn AsyncRetriever>,
    scorer: TruthScorer,
    config: RuntimeConfig,
    circuit_breaker: CircuitBreaker,
    cache: Option<EvaluationCache>,
}

impl RuntimeOrchestrator {
    /// Orchestrate `scorer`, retrieving through its own retriever.
    pub fn new(scorer: TruthScorer, config: RuntimeConfig) -> Self {
        let retriever = Arc::new(BlockingRetriever::new(Arc::clone(scorer.retriever())));
        Self::with_retriever(scorer, retriever, config)
    }

    pub fn with_retriever(
        scorer: TruthScorer,
        retriever: Arc<dyn AsyncRetriever>,
        config: RuntimeConfig,
    ) -> Self {
        let circuit_breaker = CircuitBreaker::new(config.circuit_breaker.clone());
        let cache = config
            .cache
            .enabled
            .then(|| EvaluationCache::from_config(&config.cache));

        Self {
            retriever,
            scorer,
            config,
            circuit_breaker,
            cache,
        }
    }

    pub fn builder() -> RuntimeOrchestratorBuilder {
        RuntimeOrchestratorBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn scorer(&self) -> &TruthScorer {
        &self.scorer
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state()
    }

    /// Retrieve evidence for `question` and score `answer`.
    ///
    /// # Execution Flow
    /// 1. Cache lookup
    /// 2. Retrieval (circuit check, timeout, retry, fallback)
    /// 3. Fan-out: all 4 evaluators concurrently
    /// 4. Fan-in: aggregate and gate (deterministic)
    /// 5. Cache the result if retrieval succeeded
    pub async fn evaluate(&self, question: &str, answer: &str) -> Result<RuntimeResult, RuntimeError> {
        let key = CacheKey::new(question, answer, self.scorer.config());

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&key).await {
                tracing::debug!(retriever = self.retriever.name(), "Evaluation served from cache");
                return Ok(RuntimeResult {
                    evaluation: hit.evaluation,
                    retrieval: hit.retrieval,
                    cached: true,
                });
            }
        }

        let (evidence, retrieval) = self.retrieve(question).await;
        let evaluation = self.score(question, answer, &evidence).await?;

        // A fallback result reflects a retriever outage, not the answer
        if let Some(cache) = &self.cache {
            if !retrieval.is_fallback() {
                let entry = CachedEvaluation {
                    evaluation: evaluation.clone(),
                    retrieval: retrieval.clone(),
                };
                cache.insert(key, entry).await;
            }
        }

        Ok(RuntimeResult {
            evaluation,
            retrieval,
            cached: false,
        })
    }

    /// Score `answer` against caller-supplied evidence. Never cached.
    pub async fn evaluate_with_evidence(
        &self,
        question: &str,
        answer: &str,
        evidence: &[EvidenceSnippet],
    ) -> Result<RuntimeResult, RuntimeError> {
        let evaluation = self.score(question, answer, evidence).await?;

        Ok(RuntimeResult {
            evaluation,
            retrieval: RetrievalStatus::Provided {
                snippets: evidence.len(),
            },
            cached: false,
        })
    }

    /// Evaluate many pairs with at most `batch_concurrency` in flight.
    ///
    /// Results come back in input order; one failure does not stop the batch.
    pub async fn evaluate_batch(&self, items: &[BatchItem]) -> Vec<Result<RuntimeResult, RuntimeError>> {
        let concurrency = self.config.batch_concurrency.max(1);
        tracing::info!(items = items.len(), concurrency, "Starting batch evaluation");

        let results: Vec<_> = stream::iter(items)
            .map(|item| self.evaluate(&item.question, &item.answer))
            .buffered(concurrency)
            .collect()
            .await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        tracing::info!(items = items.len(), failed, "Batch evaluation finished");
        results
    }

    /// Fetch evidence, falling back to an empty set on failure.
    async fn retrieve(&self, question: &str) -> (Vec<EvidenceSnippet>, RetrievalStatus) {
        if self.circuit_breaker.is_open() {
            tracing::warn!(
                retriever = self.retriever.name(),
                "Circuit open, scoring without evidence"
            );
            return (
                Vec::new(),
                RetrievalStatus::Fallback {
                    reason: "circuit open".to_string(),
                },
            );
        }

        let timeout = self.config.retrieval_timeout;
        let attempts = AtomicU32::new(0);

        let attempt = || async {
            attempts.fetch_add(1, Ordering::Relaxed);
            match tokio::time::timeout(timeout, self.retriever.retrieve(question)).await {
                Ok(result) => result,
                Err(_) => Err(RetrievalError::Timeout(timeout)),
            }
        };

        let result = attempt
            .retry(self.config.retry.backoff())
            .sleep(tokio::time::sleep)
            .when(RetrievalError::is_retryable)
            .notify(|err: &RetrievalError, delay| {
                tracing::warn!(
                    retriever = self.retriever.name(),
                    error = %err,
                    retry_in = ?delay,
                    "Retrieval failed, retrying"
                );
            })
            .await;

        let attempts = attempts.load(Ordering::Relaxed);
        match result {
            Ok(evidence) => {
                self.circuit_breaker.record_success();
                tracing::debug!(
                    retriever = self.retriever.name(),
                    snippets = evidence.len(),
                    attempts,
                    "Evidence retrieved"
                );
                let status = RetrievalStatus::Retrieved {
                    snippets: evidence.len(),
                    attempts,
                };
                (evidence, status)
            }
            Err(e) => {
                self.circuit_breaker.record_failure();
                tracing::warn!(
                    retriever = self.retriever.name(),
                    error = %e,
                    attempts,
                    "Retrieval failed, scoring without evidence"
                );
                (Vec::new(), RetrievalStatus::Fallback { reason: e.to_string() })
            }
        }
    }

    async fn score(
        &self,
        question: &str,
        answer: &str,
        evidence: &[EvidenceSnippet],
    ) -> Result<TruthScoreResult, RuntimeError> {
        let input = EvaluationInput::new(question, answer, evidence);

        // Fan-out: parallel component evaluation
        let (evidence, consistency, coverage, language) = tokio::join!(
            self.evaluate_component(ComponentName::Evidence, &input),
            self.evaluate_component(ComponentName::Consistency, &input),
            self.evaluate_component(ComponentName::Coverage, &input),
            self.evaluate_component(ComponentName::Language, &input),
        );

        // Fan-in: deterministic aggregation
        let result = self
            .scorer
            .finalize(vec![evidence, consistency, coverage, language])?;
        Ok(result)
    }

    async fn evaluate_component(&self, name: ComponentName, input: &EvaluationInput<'_>) -> ComponentScore {
        let score = self.scorer.evaluator(name).evaluate(input);
        tracing::debug!(component = ?name, value = score.value, "Component evaluated");
        score
    }
}

/// Builder for RuntimeOrchestrator.
pub struct RuntimeOrchestratorBuilder {
    scorer: TruthScorer,
    retriever: Option<Arc<dyn AsyncRetriever>>,
    config: RuntimeConfig,
}

impl RuntimeOrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            scorer: TruthScorer::new(),
            retriever: None,
            config: RuntimeConfig::default(),
        }
    }

    /// Set the scorer (config, checker, and default retriever).
    pub fn scorer(mut self, scorer: TruthScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Use an async retriever instead of the scorer's own.
    pub fn retriever(mut self, retriever: Arc<dyn AsyncRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<RuntimeOrchestrator, RuntimeError> {
        self.config.validate()?;

        Ok(match self.retriever {
            Some(retriever) => RuntimeOrchestrator::with_retriever(self.scorer, retriever, self.config),
            None => RuntimeOrchestrator::new(self.scorer, self.config),
        })
    }
}

impl Default for RuntimeOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
