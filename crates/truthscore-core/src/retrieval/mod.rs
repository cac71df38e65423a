//! Evidence retrieval.
//!
//! A [`Retriever`] turns a question into a short, ordered list of evidence
//! snippets. Implementations must be deterministic for a given question and
//! configuration, and must report "nothing found" as an empty list rather
//! than an error. Backends that can fail (network search, vector stores)
//! absorb their own failures and return an empty list; the async runtime
//! adds timeouts and retries on top of that.

mod keyword;

pub use keyword::{Corpus, Document, KeywordRetriever};

use serde::{Deserialize, Serialize};

use crate::types::EvidenceSnippet;

/// Default cap on snippets per question.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Default floor below which documents are not returned.
pub const DEFAULT_MIN_RELEVANCE: f64 = 0.1;

/// Capability: fetch evidence for a question.
pub trait Retriever: Send + Sync {
    /// Name used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Ordered snippets, most relevant first, at most the configured cap.
    fn retrieve(&self, question: &str) -> Vec<EvidenceSnippet>;
}

/// Retrieval limits shared by the reference retrievers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetrieverConfig {
    /// Maximum snippets returned
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Documents scoring below this are dropped
    #[serde(default = "default_min_relevance")]
    pub min_relevance: f64,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_min_relevance() -> f64 {
    DEFAULT_MIN_RELEVANCE
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            min_relevance: DEFAULT_MIN_RELEVANCE,
        }
    }
}

/// Returns the same caller-supplied evidence for every question.
///
/// Used when evidence was gathered upstream, and in tests.
#[derive(Debug, Clone)]
pub struct StaticRetriever {
    snippets: Vec<EvidenceSnippet>,
    max_results: usize,
}

impl StaticRetriever {
    pub fn new(snippets: Vec<EvidenceSnippet>) -> Self {
        Self {
            snippets,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// A retriever that never finds anything.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

impl Default for StaticRetriever {
    fn default() -> Self {
        Self::empty()
    }
}

impl Retriever for StaticRetriever {
    fn name(&self) -> &str {
        "static"
    }

    fn retrieve(&self, _question: &str) -> Vec<EvidenceSnippet> {
        self.snippets.iter().take(self.max_results).cloned().collect()
    }
}
