//! Resilience patterns for truthscore-runtime.
//!
//! Retrieval is the only fallible, slow dependency of an evaluation, so it
//! is wrapped in:
//! - a per-attempt timeout and exponential retry (see the orchestrator)
//! - a circuit breaker, so a dead retriever stops costing latency

mod circuit_breaker;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
