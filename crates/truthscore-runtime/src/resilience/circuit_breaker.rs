//! Circuit breaker around the evidence retriever.
//!
//! When retrieval fails repeatedly, the circuit opens and subsequent
//! evaluations skip retrieval and score on the empty-evidence path.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

use crate::config::human_duration;

/// Circuit breaker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CircuitBreakerConfig {
    /// Failures before opening circuit
    pub failure_threshold: u32,

    /// Time before attempting recovery
    #[serde(with = "human_duration")]
    pub recovery_timeout: Duration,

    /// Successes needed to close circuit
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

/// State of the circuit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircuitState {
    /// Normal operation
    Closed { failures: u32 },

    /// Retrieval is bypassed
    Open { opened_at: Instant },

    /// Trial calls are let through
    HalfOpen { successes: u32 },
}

/// Closed / open / half-open breaker for one retriever.
pub struct CircuitBreaker {
    state: RwLock<CircuitState>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            state: RwLock::new(CircuitState::Closed { failures: 0 }),
            config,
        }
    }

    /// True when retrieval should be skipped.
    ///
    /// An open circuit whose recovery timeout has elapsed moves to
    /// half-open and lets the call through.
    pub fn is_open(&self) -> bool {
        let state = *self.state.read();
        match state {
            CircuitState::Open { opened_at } => {
                if opened_at.elapsed() >= self.config.recovery_timeout {
                    self.transition_to_half_open();
                    false
                } else {
                    true
                }
            }
            _ => false,
        }
    }

    pub fn record_success(&self) {
        let mut state = self.state.write();
        match *state {
            CircuitState::HalfOpen { successes } => {
                if successes + 1 >= self.config.success_threshold {
                    *state = CircuitState::Closed { failures: 0 };
                    tracing::info!("Retrieval circuit closed after successful recovery");
                } else {
                    *state = CircuitState::HalfOpen {
                        successes: successes + 1,
                    };
                }
            }
            CircuitState::Closed { .. } => {
                *state = CircuitState::Closed { failures: 0 };
            }
            CircuitState::Open { .. } => {}
        }
    }

    pub fn record_failure(&self) {
        let mut state = self.state.write();
        match *state {
            CircuitState::Closed { failures } => {
                if failures + 1 >= self.config.failure_threshold {
                    *state = CircuitState::Open {
                        opened_at: Instant::now(),
                    };
                    tracing::warn!(
                        failures = failures + 1,
                        "Retrieval circuit opened after repeated failures"
                    );
                } else {
                    *state = CircuitState::Closed {
                        failures: failures + 1,
                    };
                }
            }
            CircuitState::HalfOpen { .. } => {
                *state = CircuitState::Open {
                    opened_at: Instant::now(),
                };
                tracing::warn!("Retrieval circuit reopened after failed recovery attempt");
            }
            CircuitState::Open { .. } => {}
        }
    }

    fn transition_to_half_open(&self) {
        let mut state = self.state.write();
        if matches!(*state, CircuitState::Open { .. }) {
            *state = CircuitState::HalfOpen { successes: 0 };
            tracing::info!("Retrieval circuit half-open, trying recovery");
        }
    }

    pub fn state(&self) -> CircuitState {
        *self.state.read()
    }

    pub fn reset(&self) {
        *self.state.write() = CircuitState::Closed { failures: 0 };
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}
