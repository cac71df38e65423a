//! Shared text heuristics.
//!
//! Tokenization, claim-term extraction, sentence splitting and the marker
//! lexicons used by the retriever, the entailment checker and the
//! evaluators. Everything here is a pure function of its input.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

/// Minimum shared prefix for two terms to count as related
/// ("prevents" / "prevention").
pub const RELATED_PREFIX_LEN: usize = 5;

lazy_static! {
    // =========================================================================
    // TOKENIZATION
    // =========================================================================

    /// Runs of letters or digits.
    static ref WORD_PATTERN: Regex = Regex::new(r"[\p{L}\p{N}]+").unwrap();

    /// Sentence terminators followed by whitespace or end of text.
    /// Decimal points ("3.5") are not followed by whitespace and survive.
    static ref SENTENCE_BREAK: Regex = Regex::new(r"[.!?;]+(?:\s+|$)").unwrap();

    // =========================================================================
    // POLARITY AND STANCE MARKERS
    // =========================================================================

    /// Negation cues, including contracted forms.
    pub static ref NEGATION_PATTERN: Regex = Regex::new(
        r"(?i)(\b(not|no|never|none|nobody|nothing|neither|nor|cannot|false|incorrect|untrue)\b|n['’]t\b)"
    ).unwrap();

    /// Hedging language.
    pub static ref HEDGE_PATTERN: Regex = Regex::new(
        r"(?i)\b(maybe|perhaps|possibly|might|could|uncertain|unclear|unknown|probably|likely|seems?|appears?|suggests?|indicates?|may|not sure|i think|i believe|arguably|supposedly|allegedly)\b"
    ).unwrap();

    /// Certainty language.
    pub static ref CERTAINTY_PATTERN: Regex = Regex::new(
        r"(?i)\b(definitely|certainly|always|undoubtedly|clearly|absolutely|surely|indeed|in fact|without (a )?doubt|proven|established|confirmed)\b"
    ).unwrap();

    /// Stance reversals inside a single sentence.
    pub static ref STANCE_REVERSAL_PATTERNS: Vec<(&'static str, Regex)> = vec![
        ("both answers", Regex::new(r"(?i)\b(yes and no|true and false|both true and false|right and wrong)\b").unwrap()),
        ("is and is not", Regex::new(r"(?i)\b(is and (is not|isn't)|does and (does not|doesn't)|can and (cannot|can't))\b").unwrap()),
        ("always and never", Regex::new(r"(?i)\b(always and never|never and always)\b").unwrap()),
    ];
}

/// Function words and answer particles that carry no claim.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as",
    "at", "be", "because", "been", "before", "being", "below", "between", "both", "but", "by",
    "can", "cannot", "could", "did", "do", "does", "doing", "down", "during", "each", "either",
    "false", "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here",
    "hers", "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "may", "me", "might", "more", "most", "much", "must", "my", "neither", "no", "nor", "not",
    "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "out", "over", "own",
    "same", "she", "should", "so", "some", "such", "than", "that", "the", "their", "theirs",
    "them", "then", "there", "these", "they", "this", "those", "through", "to", "too", "true",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "yes", "you", "your", "yours",
    "never", "none", "don", "doesn", "didn", "isn", "wasn", "aren", "weren", "won", "t", "s",
];

/// Lower-cased word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    WORD_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Number of word tokens.
pub fn word_count(text: &str) -> usize {
    WORD_PATTERN.find_iter(text).count()
}

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Crude plural folding: "boils" -> "boil", "colds" -> "cold".
fn normalize_term(token: &str) -> String {
    let char_count = token.chars().count();
    if char_count > 3 && token.ends_with('s') && !token.ends_with("ss") {
        token[..token.len() - 1].to_string()
    } else {
        token.to_string()
    }
}

/// Distinct claim-bearing terms: non-stopwords of two or more characters,
/// plus any number.
pub fn content_terms(text: &str) -> BTreeSet<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| !is_stopword(t))
        .filter(|t| t.chars().count() > 1 || t.chars().all(|c| c.is_numeric()))
        .map(|t| normalize_term(&t))
        .collect()
}

/// Two terms are related if equal or sharing a prefix of
/// [`RELATED_PREFIX_LEN`] characters.
pub fn terms_related(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let mut a_chars = a.chars();
    let mut b_chars = b.chars();
    for _ in 0..RELATED_PREFIX_LEN {
        match (a_chars.next(), b_chars.next()) {
            (Some(x), Some(y)) if x == y => {}
            _ => return false,
        }
    }
    true
}

/// Whether `term` is related to any member of `pool`.
pub fn term_supported(term: &str, pool: &BTreeSet<String>) -> bool {
    pool.contains(term) || pool.iter().any(|candidate| terms_related(term, candidate))
}

/// Split into trimmed, non-empty sentences.
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Whether the text carries a negation cue.
pub fn is_negated(text: &str) -> bool {
    NEGATION_PATTERN.is_match(text)
}

/// Matched hedge markers, lower-cased, in order of appearance.
pub fn hedge_markers(text: &str) -> Vec<String> {
    HEDGE_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Matched certainty markers, lower-cased, in order of appearance.
pub fn certainty_markers(text: &str) -> Vec<String> {
    CERTAINTY_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Named stance reversals with their byte span.
pub fn stance_reversals(text: &str) -> Vec<(&'static str, usize, usize)> {
    let mut found = Vec::new();
    for (name, regex) in STANCE_REVERSAL_PATTERNS.iter() {
        for m in regex.find_iter(text) {
            found.push((*name, m.start(), m.end()));
        }
    }
    found
}
