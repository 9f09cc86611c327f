//! Similarity search over a candidate pool
//!
//! Provides:
//! - Lexical keyword-overlap scoring
//! - Vector similarity search via an embedding service
//!
//! Both rank only the candidates they are handed; narrowing the corpus is the
//! job of the metadata filter.

mod keyword;
mod snippet;
mod vector;

pub use keyword::{query_terms, KeywordSearch};
pub use snippet::extract_snippet;
pub use vector::{cosine_similarity, VectorSearch};

use crate::corpus::{Document, IndexedDocument};
use crate::error::Result;
use crate::metadata::MetadataRecord;
use async_trait::async_trait;
use serde::Serialize;

/// Similarity-search collaborator
#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    /// Rank `candidates` against `query`, best first
    ///
    /// An empty pool yields an empty result without touching the backend.
    async fn search(
        &self,
        query: &str,
        candidates: &[&IndexedDocument],
    ) -> Result<Vec<ScoredDocument>>;

    fn name(&self) -> &str;
}

/// Source of search result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    Keyword,
    Vector,
}

/// One ranked match
#[derive(Debug, Clone, Serialize)]
pub struct ScoredDocument {
    pub id: String,
    pub title: String,
    pub content: String,
    pub metadata: MetadataRecord,
    pub score: f64,
    pub source: SearchSource,
}

impl ScoredDocument {
    pub fn new(indexed: &IndexedDocument, score: f64, source: SearchSource) -> Self {
        Self {
            id: indexed.document.id.clone(),
            title: indexed.document.title.clone(),
            content: indexed.document.content.clone(),
            metadata: indexed.metadata.clone(),
            score,
            source,
        }
    }
}

/// Sort by descending score; equal scores keep candidate order
pub(crate) fn sort_by_score(results: &mut [ScoredDocument]) {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Text sent to the embedding service for a document
pub fn format_document_for_embedding(document: &Document) -> String {
    let title = if document.title.is_empty() {
        "none"
    } else {
        document.title.as_str()
    };
    format!("title: {} | text: {}", title, document.content)
}

/// Text sent to the embedding service for a query
pub fn format_query_for_embedding(query: &str) -> String {
    format!("search_query: {}", query)
}
