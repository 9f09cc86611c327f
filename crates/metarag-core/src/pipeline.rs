//! Metadata-filtered query pipeline
//!
//! Stages run in order: filter extraction, subset selection, similarity
//! search over the subset. The corpus is never mutated. Each collaborator call
//! is bounded by a timeout, and a [`CancelFlag`] is checked after every stage.

use crate::config::PipelineConfig;
use crate::corpus::{CorpusStore, IndexedDocument};
use crate::error::{MetaragError, Result};
use crate::filter::{select_candidates, FilterCriteria, MetadataField, QueryFilterExtractor};
use crate::search::{ScoredDocument, SimilaritySearch};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Await `fut`, turning expiry into [`MetaragError::CollaboratorTimeout`]
pub async fn with_timeout<T, F>(operation: &str, timeout: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(MetaragError::CollaboratorTimeout {
            operation: operation.to_string(),
            timeout,
        }),
    }
}

/// Shared flag a caller sets to abandon a pending query
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Pipeline stage, used to report where a query stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    FilterExtraction,
    SubsetSelection,
    SimilaritySearch,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FilterExtraction => "filter extraction",
            Self::SubsetSelection => "subset selection",
            Self::SimilaritySearch => "similarity search",
        })
    }
}

/// Successful query result
#[derive(Debug, Clone, Serialize)]
pub struct RankedResults {
    pub query: String,
    /// Criteria extracted from the query
    pub criteria: FilterCriteria,
    /// Criteria actually used for selection (differs after broadening)
    pub applied: FilterCriteria,
    /// Field dropped by the broadening retry, if one happened
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropped: Option<MetadataField>,
    pub corpus_size: usize,
    /// Size of the candidate pool handed to search
    pub candidates: usize,
    pub hits: Vec<ScoredDocument>,
}

/// Result of one query
#[derive(Debug)]
pub enum QueryOutcome {
    Ranked(RankedResults),
    /// No document satisfied the criteria (after the optional broadening retry)
    NoMatch { query: String, criteria: FilterCriteria },
    Failed {
        stage: PipelineStage,
        error: MetaragError,
    },
    Cancelled { stage: PipelineStage },
}

impl QueryOutcome {
    pub fn hits(&self) -> &[ScoredDocument] {
        match self {
            Self::Ranked(ranked) => &ranked.hits,
            _ => &[],
        }
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch { .. })
    }
}

/// Query pipeline over a read-only corpus
pub struct Pipeline {
    extractor: QueryFilterExtractor,
    searcher: Arc<dyn SimilaritySearch>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        extractor: QueryFilterExtractor,
        searcher: Arc<dyn SimilaritySearch>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            extractor,
            searcher,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn searcher_name(&self) -> &str {
        self.searcher.name()
    }

    /// Filter criteria the pipeline would derive from `query`
    pub fn extract_filters(&self, query: &str) -> FilterCriteria {
        self.extractor.extract(query)
    }

    /// Run a metadata-filtered query
    pub async fn run(&self, query: &str, corpus: &dyn CorpusStore) -> QueryOutcome {
        self.run_with_cancel(query, corpus, &CancelFlag::new()).await
    }

    /// Run a metadata-filtered query, stopping early once `cancel` is set
    pub async fn run_with_cancel(
        &self,
        query: &str,
        corpus: &dyn CorpusStore,
        cancel: &CancelFlag,
    ) -> QueryOutcome {
        let criteria = self.extractor.extract(query);
        tracing::info!("Extracted filters for '{}': {}", query, criteria);
        if cancel.is_cancelled() {
            return QueryOutcome::Cancelled {
                stage: PipelineStage::FilterExtraction,
            };
        }

        let documents = corpus.all_documents();
        let mut applied = criteria.clone();
        let mut dropped = None;
        let mut selection = select_candidates(documents, &applied);

        if selection.is_no_match() && self.config.broaden_on_empty {
            if let Some((broader, field)) = criteria.broaden() {
                tracing::info!(
                    "No documents match {}, retrying without {}",
                    criteria,
                    field
                );
                selection = select_candidates(documents, &broader);
                applied = broader;
                dropped = Some(field);
            }
        }

        if cancel.is_cancelled() {
            return QueryOutcome::Cancelled {
                stage: PipelineStage::SubsetSelection,
            };
        }

        let candidates = match selection.into_result(&applied) {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::info!("{}", e);
                return QueryOutcome::NoMatch {
                    query: query.to_string(),
                    criteria,
                };
            }
        };

        let hits = match self.rank(query, &candidates).await {
            Ok(hits) => hits,
            Err(error) => {
                return QueryOutcome::Failed {
                    stage: PipelineStage::SimilaritySearch,
                    error,
                }
            }
        };
        if cancel.is_cancelled() {
            return QueryOutcome::Cancelled {
                stage: PipelineStage::SimilaritySearch,
            };
        }

        QueryOutcome::Ranked(RankedResults {
            query: query.to_string(),
            criteria,
            applied,
            dropped,
            corpus_size: documents.len(),
            candidates: candidates.len(),
            hits,
        })
    }

    /// Run a query over the whole corpus without metadata filtering
    pub async fn run_unfiltered(&self, query: &str, corpus: &dyn CorpusStore) -> QueryOutcome {
        let documents = corpus.all_documents();
        let candidates: Vec<&IndexedDocument> = documents.iter().collect();

        match self.rank(query, &candidates).await {
            Ok(hits) => QueryOutcome::Ranked(RankedResults {
                query: query.to_string(),
                criteria: FilterCriteria::new(),
                applied: FilterCriteria::new(),
                dropped: None,
                corpus_size: documents.len(),
                candidates: candidates.len(),
                hits,
            }),
            Err(error) => QueryOutcome::Failed {
                stage: PipelineStage::SimilaritySearch,
                error,
            },
        }
    }

    /// Search the pool, then apply `min_score` and `limit`
    async fn rank(&self, query: &str, candidates: &[&IndexedDocument]) -> Result<Vec<ScoredDocument>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let timeout = self.config.timeout();
        let mut result = with_timeout(
            "Similarity search",
            timeout,
            self.searcher.search(query, candidates),
        )
        .await;

        if self.config.retry_on_timeout && matches!(&result, Err(e) if e.is_timeout()) {
            tracing::warn!("Similarity search timed out, retrying once");
            result = with_timeout(
                "Similarity search",
                timeout,
                self.searcher.search(query, candidates),
            )
            .await;
        }

        let hits: Vec<ScoredDocument> = result?
            .into_iter()
            .filter(|hit| hit.score >= self.config.min_score)
            .take(self.config.limit)
            .collect();

        tracing::info!(
            "{} search ranked {} of {} candidates",
            self.searcher.name(),
            hits.len(),
            candidates.len()
        );
        Ok(hits)
    }
}
