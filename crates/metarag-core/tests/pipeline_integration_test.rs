//! End-to-end tests over the built-in sample corpus
//!
//! Ingests the sample documents with the regex extractor and runs the demo
//! queries through the keyword-search pipeline.

use metarag_core::{
    ingest_documents, sample_documents, Config, Corpus, CorpusStore, DocType, Document,
    ExtractionFailurePolicy, FilterCriteria, IndexedDocument, IngestConfig, KeywordSearch,
    MetadataField, Pipeline, PipelineConfig, QueryFilterExtractor, QueryOutcome,
    RegexMetadataExtractor, SAMPLE_QUERIES,
};
use std::sync::Arc;
use tempfile::TempDir;

async fn sample_corpus() -> Corpus {
    let (corpus, report) = ingest_documents(
        sample_documents(),
        &RegexMetadataExtractor::new(),
        None,
        &IngestConfig::default(),
    )
    .await;
    assert_eq!(report.indexed, 4);
    assert!(report.skipped.is_empty());
    corpus
}

fn pipeline(config: PipelineConfig) -> Pipeline {
    Pipeline::new(
        QueryFilterExtractor::new(Default::default()),
        Arc::new(KeywordSearch::new()),
        config,
    )
}

fn candidate_ids(outcome: &QueryOutcome) -> Vec<String> {
    outcome.hits().iter().map(|h| h.id.clone()).collect()
}

#[tokio::test]
async fn test_sample_metadata() {
    let corpus = sample_corpus().await;

    let auth_v2 = &corpus.get("auth_v2").unwrap().metadata;
    assert_eq!(auth_v2.service.as_deref(), Some("Authentication API"));
    assert_eq!(auth_v2.version.as_deref(), Some("2.0"));
    assert_eq!(auth_v2.doc_type, Some(DocType::Reference));
    assert_eq!(auth_v2.rate_limits, vec!["100 req/min", "1000 req/min"]);
    assert!(auth_v2.deprecated);

    let storage = &corpus.get("storage").unwrap().metadata;
    assert_eq!(storage.service.as_deref(), Some("Storage Service"));
    assert_eq!(storage.version, None);
    assert_eq!(storage.doc_type, Some(DocType::Guide));

    let troubleshooting = &corpus.get("troubleshooting").unwrap().metadata;
    assert_eq!(troubleshooting.service, None);
    assert_eq!(troubleshooting.doc_type, Some(DocType::Troubleshooting));
}

#[tokio::test]
async fn test_versioned_oauth_query() {
    let corpus = sample_corpus().await;
    let outcome = pipeline(PipelineConfig::default())
        .run(SAMPLE_QUERIES[0], &corpus)
        .await;

    let QueryOutcome::Ranked(ranked) = &outcome else {
        panic!("expected ranked outcome, got {:?}", outcome);
    };
    assert_eq!(ranked.criteria, FilterCriteria::new().with_version("2.0"));
    assert_eq!(ranked.candidates, 1);
    assert_eq!(candidate_ids(&outcome), vec!["auth_v2"]);
}

#[tokio::test]
async fn test_service_query_keeps_corpus_order() {
    let corpus = sample_corpus().await;
    let outcome = pipeline(PipelineConfig::default())
        .run(SAMPLE_QUERIES[1], &corpus)
        .await;

    let QueryOutcome::Ranked(ranked) = &outcome else {
        panic!("expected ranked outcome, got {:?}", outcome);
    };
    assert_eq!(ranked.applied.service.as_deref(), Some("Authentication API"));
    assert_eq!(ranked.candidates, 2);
    // equal scores keep ingestion order
    assert_eq!(candidate_ids(&outcome), vec!["auth_v2", "auth_v1"]);
}

#[tokio::test]
async fn test_troubleshooting_and_storage_queries() {
    let corpus = sample_corpus().await;
    let pipeline = pipeline(PipelineConfig::default());

    let outcome = pipeline.run(SAMPLE_QUERIES[2], &corpus).await;
    assert_eq!(candidate_ids(&outcome), vec!["troubleshooting"]);

    let outcome = pipeline.run(SAMPLE_QUERIES[3], &corpus).await;
    assert_eq!(candidate_ids(&outcome), vec!["storage"]);
}

#[tokio::test]
async fn test_unfiltered_run_sees_whole_corpus() {
    let corpus = sample_corpus().await;
    let outcome = pipeline(PipelineConfig::default())
        .run_unfiltered(SAMPLE_QUERIES[0], &corpus)
        .await;

    let QueryOutcome::Ranked(ranked) = outcome else {
        panic!("expected ranked outcome");
    };
    assert_eq!(ranked.candidates, corpus.len());
    assert!(ranked.criteria.is_unconstrained());
    assert!(ranked.hits.len() > 1);
}

#[tokio::test]
async fn test_unknown_version_then_broadened() {
    let corpus = sample_corpus().await;
    let query = "authentication rate limits in version 3.0";

    let strict = pipeline(PipelineConfig::default()).run(query, &corpus).await;
    assert!(strict.is_no_match());

    // doc_type is absent, so broadening drops service and keeps version 3.0
    let broad = pipeline(PipelineConfig {
        broaden_on_empty: true,
        ..PipelineConfig::default()
    })
    .run(query, &corpus)
    .await;
    assert!(broad.is_no_match());
}

#[tokio::test]
async fn test_broadening_reports_dropped_field() {
    let corpus = sample_corpus().await;
    let outcome = pipeline(PipelineConfig {
        broaden_on_empty: true,
        ..PipelineConfig::default()
    })
    .run("storage pricing tutorial", &corpus)
    .await;

    let QueryOutcome::Ranked(ranked) = &outcome else {
        panic!("expected ranked outcome, got {:?}", outcome);
    };
    // storage is a guide, so the doc_type constraint alone is satisfiable
    assert_eq!(ranked.dropped, None);

    let outcome = pipeline(PipelineConfig {
        broaden_on_empty: true,
        ..PipelineConfig::default()
    })
    .run("storage reference pricing", &corpus)
    .await;
    let QueryOutcome::Ranked(ranked) = &outcome else {
        panic!("expected ranked outcome, got {:?}", outcome);
    };
    assert_eq!(ranked.dropped, Some(MetadataField::DocType));
    assert_eq!(candidate_ids(&outcome), vec!["storage"]);
}

#[tokio::test]
async fn test_failed_extraction_policies() {
    let documents = vec![
        Document::new("empty", "", "   "),
        Document::new("storage", "Storage Service Guide", "Upload files."),
    ];

    let (skipped, report) = ingest_documents(
        documents.clone(),
        &RegexMetadataExtractor::new(),
        None,
        &IngestConfig::default(),
    )
    .await;
    assert_eq!(skipped.len(), 1);
    assert_eq!(report.skipped, vec!["empty"]);

    let (kept, report) = ingest_documents(
        documents,
        &RegexMetadataExtractor::new(),
        None,
        &IngestConfig {
            on_extraction_failure: ExtractionFailurePolicy::EmptyRecord,
            ..IngestConfig::default()
        },
    )
    .await;
    assert_eq!(kept.len(), 2);
    assert_eq!(report.fallback, vec!["empty"]);

    // a document without metadata survives only unconstrained queries
    let pipeline = pipeline(PipelineConfig::default());
    let outcome = pipeline.run("storage files", &kept).await;
    assert_eq!(candidate_ids(&outcome), vec!["storage"]);
}

#[tokio::test]
async fn test_corpus_snapshot_roundtrip() {
    let corpus = sample_corpus().await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshots").join("corpus.json");

    corpus.save_json(&path).unwrap();
    let loaded = Corpus::load_json(&path).unwrap();

    let ids = |c: &Corpus| -> Vec<String> {
        c.all_documents().iter().map(|d: &IndexedDocument| d.id().to_string()).collect()
    };
    assert_eq!(ids(&loaded), ids(&corpus));
    assert_eq!(
        loaded.get("auth_v1").unwrap().metadata,
        corpus.get("auth_v1").unwrap().metadata
    );
}

#[tokio::test]
async fn test_config_driven_pipeline() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yml");
    std::fs::write(
        &path,
        r#"
pipeline:
  limit: 1
filter_rules:
  services:
    - value: Storage Service
      keywords: [bucket, buckets]
"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    let pipeline = Pipeline::new(
        QueryFilterExtractor::new(config.filter_rules.clone()),
        Arc::new(KeywordSearch::new()),
        config.pipeline.clone(),
    );

    let corpus = sample_corpus().await;
    let outcome = pipeline.run("object storage buckets pricing", &corpus).await;
    let QueryOutcome::Ranked(ranked) = &outcome else {
        panic!("expected ranked outcome, got {:?}", outcome);
    };
    assert_eq!(ranked.applied.service.as_deref(), Some("Storage Service"));
    assert_eq!(ranked.hits.len(), 1);
}
