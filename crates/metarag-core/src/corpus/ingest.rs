//! Corpus ingestion
//!
//! Runs the extraction collaborator once per document. A failing document
//! never aborts the batch: it is logged and skipped, or indexed with an
//! all-absent record when the config asks for that.

use super::{Corpus, Document, IndexedDocument};
use crate::config::{ExtractionFailurePolicy, IngestConfig};
use crate::error::Result;
use crate::llm::Embedder;
use crate::metadata::{MetadataExtractor, MetadataRecord};
use crate::pipeline::with_timeout;
use crate::search::format_document_for_embedding;
use serde::Serialize;

/// Summary of one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Documents added to the corpus
    pub indexed: usize,
    /// Ids dropped because extraction failed
    pub skipped: Vec<String>,
    /// Ids indexed with an all-absent record after extraction failed
    pub fallback: Vec<String>,
    /// Documents that received a precomputed embedding
    pub embedded: usize,
}

/// Build a corpus from raw documents
pub async fn ingest_documents(
    documents: Vec<Document>,
    extractor: &dyn MetadataExtractor,
    embedder: Option<&dyn Embedder>,
    config: &IngestConfig,
) -> (Corpus, IngestReport) {
    let mut report = IngestReport::default();
    let mut corpus = Corpus::new();
    let timeout = config.timeout();

    tracing::info!(
        "Ingesting {} documents with {} extractor",
        documents.len(),
        extractor.name()
    );

    for document in documents {
        let mut outcome =
            with_timeout("Metadata extraction", timeout, extractor.extract(&document)).await;
        if config.retry_on_timeout && matches!(&outcome, Err(e) if e.is_timeout()) {
            tracing::warn!("Extraction of '{}' timed out, retrying once", document.id);
            outcome =
                with_timeout("Metadata extraction", timeout, extractor.extract(&document)).await;
        }

        let metadata = match outcome {
            Ok(metadata) => metadata,
            Err(e) => match config.on_extraction_failure {
                ExtractionFailurePolicy::Skip => {
                    tracing::warn!("Skipping document '{}': {}", document.id, e);
                    report.skipped.push(document.id);
                    continue;
                }
                ExtractionFailurePolicy::EmptyRecord => {
                    tracing::warn!(
                        "Indexing '{}' without metadata after extraction failure: {}",
                        document.id,
                        e
                    );
                    report.fallback.push(document.id.clone());
                    MetadataRecord::empty(&document.id)
                }
            },
        };

        tracing::debug!(
            "Extracted metadata for '{}': service={:?} version={:?} doc_type={:?}",
            document.id,
            metadata.service,
            metadata.version,
            metadata.doc_type
        );

        let id = document.id.clone();
        match corpus.push(IndexedDocument::new(document, metadata)) {
            Ok(()) => report.indexed += 1,
            Err(e) => {
                tracing::warn!("Skipping document '{}': {}", id, e);
                report.skipped.push(id);
            }
        }
    }

    if let Some(embedder) = embedder {
        match embed_corpus(&mut corpus, embedder, config).await {
            Ok(count) => report.embedded = count,
            Err(e) => tracing::warn!(
                "Embedding at ingestion failed, search will embed lazily: {}",
                e
            ),
        }
    }

    tracing::info!(
        "Ingestion finished: {} indexed, {} skipped, {} without metadata",
        report.indexed,
        report.skipped.len(),
        report.fallback.len()
    );

    (corpus, report)
}

async fn embed_corpus(
    corpus: &mut Corpus,
    embedder: &dyn Embedder,
    config: &IngestConfig,
) -> Result<usize> {
    if corpus.documents.is_empty() {
        return Ok(0);
    }

    let texts: Vec<String> = corpus
        .documents
        .iter()
        .map(|d| format_document_for_embedding(&d.document))
        .collect();

    let embeddings =
        with_timeout("Embedding", config.timeout(), embedder.embed_batch(&texts)).await?;

    let mut count = 0;
    for (indexed, embedding) in corpus.documents.iter_mut().zip(embeddings) {
        indexed.embedding = Some(embedding);
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusStore;
    use crate::metadata::RegexMetadataExtractor;
    use async_trait::async_trait;
    use std::time::Duration;

    struct SlowExtractor;

    #[async_trait]
    impl MetadataExtractor for SlowExtractor {
        async fn extract(&self, document: &Document) -> Result<MetadataRecord> {
            if document.id == "slow" {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            Ok(MetadataRecord::empty(&document.id).with_version("1.0"))
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    fn docs() -> Vec<Document> {
        vec![
            Document::new("a", "Payment API v1.0", "Payments"),
            Document::new("blank", "Empty", ""),
            Document::new("b", "Payment API v2.0", "Payments again"),
        ]
    }

    #[tokio::test]
    async fn test_failing_document_is_skipped() {
        let config = IngestConfig::default();
        let (corpus, report) =
            ingest_documents(docs(), &RegexMetadataExtractor::new(), None, &config).await;

        let ids: Vec<&str> = corpus.all_documents().iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(report.indexed, 2);
        assert_eq!(report.skipped, vec!["blank".to_string()]);
        assert!(report.fallback.is_empty());
    }

    #[tokio::test]
    async fn test_failing_document_gets_empty_record() {
        let config = IngestConfig {
            on_extraction_failure: ExtractionFailurePolicy::EmptyRecord,
            ..IngestConfig::default()
        };
        let (corpus, report) =
            ingest_documents(docs(), &RegexMetadataExtractor::new(), None, &config).await;

        assert_eq!(corpus.len(), 3);
        assert!(corpus.get("blank").unwrap().metadata.is_empty());
        assert_eq!(report.fallback, vec!["blank".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_extraction_timeout_is_recovered() {
        let config = IngestConfig {
            timeout_secs: 5,
            retry_on_timeout: true,
            ..IngestConfig::default()
        };
        let documents = vec![
            Document::new("slow", "", "never answers"),
            Document::new("fast", "", "answers"),
        ];

        let (corpus, report) = ingest_documents(documents, &SlowExtractor, None, &config).await;

        assert_eq!(corpus.len(), 1);
        assert!(corpus.get("fast").is_some());
        assert_eq!(report.skipped, vec!["slow".to_string()]);
    }

    #[tokio::test]
    async fn test_embeddings_attached() {
        let config = IngestConfig::default();
        let (corpus, report) = ingest_documents(
            docs(),
            &RegexMetadataExtractor::new(),
            Some(&FixedEmbedder),
            &config,
        )
        .await;

        assert_eq!(report.embedded, 2);
        assert!(corpus
            .all_documents()
            .iter()
            .all(|d| d.embedding.as_deref() == Some(&[1.0, 0.0][..])));
    }
}
