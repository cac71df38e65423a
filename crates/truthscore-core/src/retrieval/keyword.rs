//! Keyword-overlap retrieval over an in-memory corpus.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use super::{Retriever, RetrieverConfig};
use crate::config::ConfigError;
use crate::text::{content_terms, term_supported};
use crate::types::EvidenceSnippet;

/// A document the retriever can return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// A collection of documents with their claim terms precomputed.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<(Document, BTreeSet<String>)>,
}

impl Corpus {
    pub fn new(documents: Vec<Document>) -> Self {
        let entries = documents
            .into_iter()
            .map(|doc| {
                let terms = content_terms(&doc.text);
                (doc, terms)
            })
            .collect();
        Self { entries }
    }

    /// Load a JSON array of `{ "id": ..., "text": ... }` documents.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let documents: Vec<Document> = serde_json::from_str(json)?;
        Ok(Self::new(documents))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scores documents by the share of the question's terms they contain.
///
/// Relevance is `|question terms found in document| / |question terms|`.
/// Ties are broken by document id so output order is stable.
#[derive(Debug, Clone, Default)]
pub struct KeywordRetriever {
    corpus: Corpus,
    config: RetrieverConfig,
}

impl KeywordRetriever {
    pub fn new(corpus: Corpus) -> Self {
        Self {
            corpus,
            config: RetrieverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RetrieverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    fn relevance(question_terms: &BTreeSet<String>, doc_terms: &BTreeSet<String>) -> f64 {
        if question_terms.is_empty() {
            return 0.0;
        }
        let hits = question_terms
            .iter()
            .filter(|term| term_supported(term, doc_terms))
            .count();
        hits as f64 / question_terms.len() as f64
    }
}

impl Retriever for KeywordRetriever {
    fn name(&self) -> &str {
        "keyword"
    }

    fn retrieve(&self, question: &str) -> Vec<EvidenceSnippet> {
        let question_terms = content_terms(question);

        let mut scored: Vec<(f64, &Document)> = self
            .corpus
            .entries
            .iter()
            .map(|(doc, terms)| (Self::relevance(&question_terms, terms), doc))
            .filter(|(relevance, _)| *relevance > 0.0 && *relevance >= self.config.min_relevance)
            .collect();

        scored.sort_by(|(ra, da), (rb, db)| rb.total_cmp(ra).then_with(|| da.id.cmp(&db.id)));

        let snippets: Vec<EvidenceSnippet> = scored
            .into_iter()
            .take(self.config.max_results)
            .map(|(relevance, doc)| EvidenceSnippet::new(doc.text.clone(), doc.id.clone(), relevance))
            .collect();

        tracing::debug!(
            retriever = self.name(),
            corpus_size = self.corpus.len(),
            found = snippets.len(),
            "Keyword retrieval complete"
        );

        snippets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Corpus {
        Corpus::new(vec![
            Document::new(
                "boiling",
                "Water boils at 100 degrees Celsius at sea level under standard pressure.",
            ),
            Document::new("freezing", "Water freezes at 0 degrees Celsius."),
            Document::new("paris", "Paris is the capital of France."),
            Document::new("boiling-altitude", "At high altitude water boils below 100 degrees."),
        ])
    }

    #[test]
    fn test_most_relevant_first() {
        let retriever = KeywordRetriever::new(corpus());
        let found = retriever.retrieve("At what temperature does water boil at sea level?");
        assert!(!found.is_empty());
        assert_eq!(found[0].source_id, "boiling");
        assert!(found.iter().all(|s| s.source_id != "paris"));
        assert!(found.windows(2).all(|w| w[0].relevance >= w[1].relevance));
    }

    #[test]
    fn test_deterministic_order() {
        let retriever = KeywordRetriever::new(corpus());
        let first = retriever.retrieve("Does water boil or freeze?");
        let second = retriever.retrieve("Does water boil or freeze?");
        assert_eq!(first, second);
    }

    #[test]
    fn test_max_results_cap() {
        let config = RetrieverConfig {
            max_results: 1,
            min_relevance: 0.0,
        };
        let retriever = KeywordRetriever::new(corpus()).with_config(config);
        assert_eq!(retriever.retrieve("water degrees").len(), 1);
    }

    #[test]
    fn test_no_match_is_empty() {
        let retriever = KeywordRetriever::new(corpus());
        assert!(retriever.retrieve("What did Cleopatra look like?").is_empty());
    }

    #[test]
    fn test_empty_corpus() {
        let retriever = KeywordRetriever::default();
        assert!(retriever.retrieve("Is water wet?").is_empty());
    }

    #[test]
    fn test_corpus_from_json() {
        let corpus = Corpus::from_json(r#"[{"id": "a", "text": "Alpha"}, {"id": "b", "text": "Beta"}]"#)
            .unwrap();
        assert_eq!(corpus.len(), 2);
    }
}
