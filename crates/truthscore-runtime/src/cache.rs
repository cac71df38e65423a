//! Caching layer for truthscore-runtime.
//!
//! Scoring is deterministic, so a (question, answer, config) triple always
//! maps to the same result once evidence has been retrieved. Caching skips
//! repeated retrieval, which is the slow part.

use moka::future::Cache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use truthscore_core::{ScoringConfig, TruthScoreResult};

use crate::config::CacheConfig;
use crate::orchestrator::RetrievalStatus;

/// Cache key for evaluation results.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    question: String,
    answer: String,
    config_hash: u64,
}

impl CacheKey {
    pub fn new(question: &str, answer: &str, config: &ScoringConfig) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
            config_hash: hash_config(config),
        }
    }
}

/// A cached evaluation together with how its evidence was obtained.
#[derive(Clone, Debug)]
pub struct CachedEvaluation {
    pub evaluation: TruthScoreResult,
    pub retrieval: RetrievalStatus,
}

/// Evaluation cache using moka.
pub struct EvaluationCache {
    cache: Cache<CacheKey, CachedEvaluation>,
}

impl EvaluationCache {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, config.ttl)
    }

    pub async fn get(&self, key: &CacheKey) -> Option<CachedEvaluation> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: CacheKey, entry: CachedEvaluation) {
        self.cache.insert(key, entry).await;
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Approximate; pending maintenance may not be reflected yet.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl Default for EvaluationCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

fn hash_config(config: &ScoringConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    for (name, weight) in config.weights().iter() {
        name.hash(&mut hasher);
        weight.to_bits().hash(&mut hasher);
    }
    config.accept_threshold().to_bits().hash(&mut hasher);
    config.qualified_threshold().to_bits().hash(&mut hasher);
    config.sigmoid_steepness().to_bits().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use truthscore_core::evaluate_truthfulness;

    fn entry() -> CachedEvaluation {
        CachedEvaluation {
            evaluation: evaluate_truthfulness("Is the sky blue?", "The sky is blue.", None).unwrap(),
            retrieval: RetrievalStatus::Retrieved {
                snippets: 0,
                attempts: 1,
            },
        }
    }

    #[tokio::test]
    async fn test_cache_operations() {
        let cache = EvaluationCache::default();
        let key = CacheKey::new("Is the sky blue?", "The sky is blue.", &ScoringConfig::default());

        // Cache miss
        assert!(cache.get(&key).await.is_none());

        let stored = entry();
        cache.insert(key.clone(), stored.clone()).await;

        // Cache hit
        let cached = cache.get(&key).await.unwrap();
        assert_eq!(cached.evaluation, stored.evaluation);
        assert_eq!(cached.retrieval, stored.retrieval);

        cache.run_pending_tasks().await;
        assert_eq!(cache.entry_count(), 1);

        cache.invalidate_all();
        assert!(cache.get(&key).await.is_none());
    }

    #[test]
    fn test_key_depends_on_config() {
        let default = ScoringConfig::default();
        let strict = default.with_thresholds(0.9, 0.7).unwrap();

        assert_eq!(
            CacheKey::new("q", "a", &default),
            CacheKey::new("q", "a", &ScoringConfig::default())
        );
        assert_ne!(CacheKey::new("q", "a", &default), CacheKey::new("q", "a", &strict));
        assert_ne!(CacheKey::new("q", "a", &default), CacheKey::new("q", "b", &default));
    }
}
