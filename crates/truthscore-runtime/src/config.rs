//! Runtime configuration.
//!
//! Durations are written in human-readable form (`"2s"`, `"50ms"`, `"1h"`).
//!
//! ```yaml
//! retrieval_timeout: 2s
//! retry:
//!   max_retries: 3
//!   min_backoff: 50ms
//!   max_backoff: 1s
//! circuit_breaker:
//!   failure_threshold: 3
//!   recovery_timeout: 30s
//!   success_threshold: 2
//! cache:
//!   enabled: true
//!   max_entries: 10000
//!   ttl: 1h
//! batch_concurrency: 4
//! ```

use backon::ExponentialBuilder;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::orchestrator::RuntimeError;
use crate::resilience::CircuitBreakerConfig;

/// Configuration for the runtime orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Upper bound on a single retrieval attempt
    #[serde(with = "human_duration")]
    pub retrieval_timeout: Duration,

    /// Retry policy for retryable retrieval failures
    pub retry: RetryConfig,

    /// Circuit breaker around the retriever
    pub circuit_breaker: CircuitBreakerConfig,

    /// Result cache
    pub cache: CacheConfig,

    /// Evaluations in flight at once during a batch
    pub batch_concurrency: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            retrieval_timeout: Duration::from_secs(2),
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            cache: CacheConfig::default(),
            batch_concurrency: 4,
        }
    }
}

impl RuntimeConfig {
    /// Parse and validate a YAML runtime config.
    pub fn from_yaml(yaml: &str) -> Result<Self, RuntimeError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML runtime config from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.retrieval_timeout.is_zero() {
            return Err(RuntimeError::InvalidConfig(
                "retrieval_timeout must be greater than zero".to_string(),
            ));
        }
        if self.retry.min_backoff > self.retry.max_backoff {
            return Err(RuntimeError::InvalidConfig(format!(
                "retry.min_backoff ({}) exceeds retry.max_backoff ({})",
                humantime::format_duration(self.retry.min_backoff),
                humantime::format_duration(self.retry.max_backoff),
            )));
        }
        if self.circuit_breaker.failure_threshold == 0 || self.circuit_breaker.success_threshold == 0 {
            return Err(RuntimeError::InvalidConfig(
                "circuit breaker thresholds must be at least 1".to_string(),
            ));
        }
        if self.batch_concurrency == 0 {
            return Err(RuntimeError::InvalidConfig(
                "batch_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Exponential backoff for retrieval retries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Retries after the first attempt; 0 disables retrying
    pub max_retries: usize,

    #[serde(with = "human_duration")]
    pub min_backoff: Duration,

    #[serde(with = "human_duration")]
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryConfig {
    pub(crate) fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_backoff)
            .with_max_delay(self.max_backoff)
            .with_max_times(self.max_retries)
    }
}

/// Result cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: u64,
    #[serde(with = "human_duration")]
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 10_000,
            ttl: Duration::from_secs(3600),
        }
    }
}

/// Serde adapter for `humantime` durations.
pub(crate) mod human_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}
