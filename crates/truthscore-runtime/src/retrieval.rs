//! Async retrieval interface.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use truthscore_core::{EvidenceSnippet, Retriever};

/// Errors from evidence retrievers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetrievalError {
    #[error("Retrieval timed out after {0:?}")]
    Timeout(Duration),

    #[error("Retriever unavailable: {0}")]
    Unavailable(String),

    #[error("Retrieval rejected: {0}")]
    Rejected(String),
}

impl RetrievalError {
    /// Timeouts and unavailability are transient; rejections are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Unavailable(_))
    }
}

/// Evidence source that may be remote, slow, or down.
///
/// # Contract
/// - Returns at most a bounded number of snippets, best first
/// - An empty list is a valid answer, not an error
/// - Must not hold state that changes scores between identical calls
#[async_trait]
pub trait AsyncRetriever: Send + Sync {
    fn name(&self) -> &str;

    async fn retrieve(&self, question: &str) -> Result<Vec<EvidenceSnippet>, RetrievalError>;
}

/// Runs a synchronous core [`Retriever`] on the blocking pool.
pub struct BlockingRetriever {
    inner: Arc<dyn Retriever>,
}

impl BlockingRetriever {
    pub fn new(inner: Arc<dyn Retriever>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl AsyncRetriever for BlockingRetriever {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn retrieve(&self, question: &str) -> Result<Vec<EvidenceSnippet>, RetrievalError> {
        let inner = Arc::clone(&self.inner);
        let question = question.to_string();

        tokio::task::spawn_blocking(move || inner.retrieve(&question))
            .await
            .map_err(|e| RetrievalError::Unavailable(e.to_string()))
    }
}
