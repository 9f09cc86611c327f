//! JSON output formatter

use super::SNIPPET_LEN;
use metarag_core::search::extract_snippet;
use metarag_core::{Corpus, CorpusStore, FilterCriteria, IngestReport, QueryOutcome, ScoredDocument};
use serde_json::{json, Value};

pub fn to_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string()) + "\n"
}

pub fn outcome_value(outcome: &QueryOutcome) -> Value {
    match outcome {
        QueryOutcome::Ranked(ranked) => json!({
            "status": "ranked",
            "query": ranked.query,
            "filters": ranked.criteria,
            "applied_filters": ranked.applied,
            "dropped_filter": ranked.dropped,
            "corpus_size": ranked.corpus_size,
            "candidates": ranked.candidates,
            "results": ranked
                .hits
                .iter()
                .map(|hit| hit_value(hit, &ranked.query))
                .collect::<Vec<_>>(),
        }),
        QueryOutcome::NoMatch { query, criteria } => json!({
            "status": "no_match",
            "query": query,
            "filters": criteria,
        }),
        QueryOutcome::Failed { stage, error } => json!({
            "status": "failed",
            "stage": stage,
            "error": error.to_string(),
        }),
        QueryOutcome::Cancelled { stage } => json!({
            "status": "cancelled",
            "stage": stage,
        }),
    }
}

fn hit_value(hit: &ScoredDocument, query: &str) -> Value {
    json!({
        "id": hit.id,
        "title": hit.title,
        "score": hit.score,
        "source": hit.source,
        "metadata": hit.metadata,
        "snippet": extract_snippet(&hit.content, query, Some(SNIPPET_LEN)),
    })
}

pub fn criteria_value(query: &str, criteria: &FilterCriteria) -> Value {
    json!({
        "query": query,
        "filters": criteria,
    })
}

pub fn metadata_value(corpus: &Corpus, report: &IngestReport) -> Value {
    let documents: Vec<Value> = corpus
        .all_documents()
        .iter()
        .map(|indexed| {
            json!({
                "id": indexed.id(),
                "title": indexed.document.title,
                "hash": indexed.hash,
                "indexed_at": indexed.indexed_at,
                "metadata": indexed.metadata,
            })
        })
        .collect();

    json!({
        "documents": documents,
        "ingest": report,
    })
}
