//! # truthscore-runtime
//!
//! Async evaluation runtime for TruthScore.
//!
//! `truthscore-core` scores an answer synchronously against whatever the
//! configured retriever returns. This crate adds what a service needs
//! around that:
//!
//! - Async retrieval with timeout, retry, and a circuit breaker
//! - Fallback to the empty-evidence path when retrieval fails
//! - Concurrent evaluator fan-out and bounded-concurrency batches
//! - A result cache for repeated (question, answer) pairs
//! - Verification-gated answering ([`GatedResponder`])
//! - Append-only JSON-lines evaluation records
//!
//! Scores are identical to the core's for the same evidence; the runtime
//! only changes how evidence is obtained.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use truthscore_core::{Corpus, KeywordRetriever, TruthScorer};
//! use truthscore_runtime::{RuntimeConfig, RuntimeOrchestrator};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let corpus = Corpus::from_json_file("corpus.json")?;
//! let scorer = TruthScorer::new().with_retriever(Arc::new(KeywordRetriever::new(corpus)));
//! let orchestrator = RuntimeOrchestrator::builder()
//!     .scorer(scorer)
//!     .config(RuntimeConfig::default())
//!     .build()?;
//!
//! let result = orchestrator
//!     .evaluate("What is the capital of France?", "Paris.")
//!     .await?;
//! println!("{} ({:.3})", result.evaluation.decision, result.evaluation.score);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod gating;
pub mod orchestrator;
pub mod record;
pub mod resilience;
pub mod retrieval;

pub use cache::{CacheKey, CachedEvaluation, EvaluationCache};
pub use config::{CacheConfig, RetryConfig, RuntimeConfig};
pub use gating::{
    AnswerGenerator, GatedAnswer, GatedResponder, GeneratedAnswer, GenerationError,
    GATED_METHOD, REFUSAL_MESSAGE,
};
pub use orchestrator::{
    BatchItem, RetrievalStatus, RuntimeError, RuntimeOrchestrator, RuntimeOrchestratorBuilder,
    RuntimeResult,
};
pub use record::{EvaluationRecord, JsonlSink, SinkError};
pub use resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use retrieval::{AsyncRetriever, BlockingRetriever, RetrievalError};
