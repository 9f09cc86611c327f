//! Lexical keyword-overlap search
//!
//! Scores each candidate by the fraction of distinct query terms (stop words
//! removed) that occur in its title or content.

use super::{sort_by_score, ScoredDocument, SearchSource, SimilaritySearch};
use crate::corpus::IndexedDocument;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;

/// Common English stop words ignored when scoring
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from",
    "has", "have", "he", "i", "in", "is", "it", "its", "me", "my", "of",
    "on", "that", "the", "to", "was", "will", "with", "does", "do", "did",
    "can", "could", "should", "would", "what", "where", "when", "why", "how",
    "who", "which", "this", "these", "those", "there", "here", "you", "your",
];

/// Keyword search needing no external service
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordSearch;

impl KeywordSearch {
    pub fn new() -> Self {
        Self
    }

    fn score(terms: &[String], indexed: &IndexedDocument) -> f64 {
        if terms.is_empty() {
            return 0.0;
        }
        let text = format!("{} {}", indexed.document.title, indexed.document.content);
        let words: HashSet<String> = words(&text).collect();
        let hits = terms.iter().filter(|t| words.contains(t.as_str())).count();
        hits as f64 / terms.len() as f64
    }
}

#[async_trait]
impl SimilaritySearch for KeywordSearch {
    async fn search(
        &self,
        query: &str,
        candidates: &[&IndexedDocument],
    ) -> Result<Vec<ScoredDocument>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let terms = query_terms(query);
        let mut results: Vec<ScoredDocument> = candidates
            .iter()
            .filter_map(|indexed| {
                let score = Self::score(&terms, indexed);
                (score > 0.0).then(|| ScoredDocument::new(indexed, score, SearchSource::Keyword))
            })
            .collect();

        sort_by_score(&mut results);
        Ok(results)
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Distinct lowercase query terms, stop words removed, in first-seen order
pub fn query_terms(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    words(query)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '.'))
        .map(|w| w.trim_matches('.').to_lowercase())
        .filter(|w| !w.is_empty())
}
