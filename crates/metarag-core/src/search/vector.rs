//! Vector similarity search
//!
//! Computes cosine similarity between the query embedding and candidate
//! embeddings. Candidates embedded at ingestion time are reused; the rest are
//! embedded in one batch per query.

use super::{
    format_document_for_embedding, format_query_for_embedding, sort_by_score, ScoredDocument,
    SearchSource, SimilaritySearch,
};
use crate::corpus::IndexedDocument;
use crate::error::{MetaragError, Result};
use crate::llm::Embedder;
use async_trait::async_trait;
use std::sync::Arc;

/// Embedding-backed similarity search
pub struct VectorSearch {
    embedder: Arc<dyn Embedder>,
}

impl VectorSearch {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    async fn candidate_embeddings(&self, candidates: &[&IndexedDocument]) -> Result<Vec<Vec<f32>>> {
        let missing: Vec<usize> = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.embedding.is_none())
            .map(|(i, _)| i)
            .collect();

        let mut fetched = Vec::new().into_iter();
        if !missing.is_empty() {
            tracing::debug!("Embedding {} candidates without stored vectors", missing.len());
            let texts: Vec<String> = missing
                .iter()
                .map(|&i| format_document_for_embedding(&candidates[i].document))
                .collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;
            if embeddings.len() != texts.len() {
                return Err(MetaragError::Search(format!(
                    "Expected {} embeddings, got {}",
                    texts.len(),
                    embeddings.len()
                )));
            }
            fetched = embeddings.into_iter();
        }

        Ok(candidates
            .iter()
            .map(|c| match &c.embedding {
                Some(embedding) => embedding.clone(),
                None => fetched.next().unwrap_or_default(),
            })
            .collect())
    }
}

#[async_trait]
impl SimilaritySearch for VectorSearch {
    async fn search(
        &self,
        query: &str,
        candidates: &[&IndexedDocument],
    ) -> Result<Vec<ScoredDocument>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedder
            .embed(&format_query_for_embedding(query))
            .await?;
        let embeddings = self.candidate_embeddings(candidates).await?;

        let mut results: Vec<ScoredDocument> = candidates
            .iter()
            .zip(embeddings.iter())
            .map(|(indexed, embedding)| {
                let score = cosine_similarity(&query_embedding, embedding) as f64;
                ScoredDocument::new(indexed, score, SearchSource::Vector)
            })
            .collect();

        sort_by_score(&mut results);
        Ok(results)
    }

    fn name(&self) -> &str {
        self.embedder.model_name()
    }
}

/// Compute cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
