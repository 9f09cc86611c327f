//! Terminal output formatter

use super::SNIPPET_LEN;
use metarag_core::search::extract_snippet;
use metarag_core::{
    Corpus, CorpusStore, FilterCriteria, IngestReport, MetadataRecord, QueryOutcome,
};

pub fn format_outcome(outcome: &QueryOutcome) -> String {
    let mut output = String::new();

    match outcome {
        QueryOutcome::Ranked(ranked) => {
            output.push_str(&format!("  Filters: {}\n", ranked.criteria));
            if let Some(field) = ranked.dropped {
                output.push_str(&format!(
                    "  Nothing matched; broadened by dropping {} to: {}\n",
                    field, ranked.applied
                ));
            }
            output.push_str(&format!(
                "  Found {} documents ({} candidates of {})\n",
                ranked.hits.len(),
                ranked.candidates,
                ranked.corpus_size
            ));

            for (rank, hit) in ranked.hits.iter().enumerate() {
                output.push_str(&format!(
                    "  {:>2}. {:<16} {:.3}  {}\n",
                    rank + 1,
                    hit.id,
                    hit.score,
                    describe(&hit.metadata)
                ));
                let snippet = extract_snippet(&hit.content, &ranked.query, Some(SNIPPET_LEN));
                output.push_str(&format!("      {}\n", snippet.replace('\n', " ")));
            }
        }
        QueryOutcome::NoMatch { criteria, .. } => {
            output.push_str(&format!("  Filters: {}\n", criteria));
            output.push_str("  No documents match these filters\n");
        }
        QueryOutcome::Failed { stage, error } => {
            output.push_str(&format!("  Failed during {}: {}\n", stage, error));
        }
        QueryOutcome::Cancelled { stage } => {
            output.push_str(&format!("  Cancelled after {}\n", stage));
        }
    }

    output
}

pub fn format_criteria(query: &str, criteria: &FilterCriteria) -> String {
    let show = |value: Option<&str>| value.unwrap_or("-").to_string();
    format!(
        "Query: {}\n  service:  {}\n  version:  {}\n  doc_type: {}\n",
        query,
        show(criteria.service.as_deref()),
        show(criteria.version.as_deref()),
        show(criteria.doc_type.as_deref())
    )
}

pub fn format_metadata(corpus: &Corpus, report: &IngestReport) -> String {
    let mut output = String::new();

    for indexed in corpus.all_documents() {
        let metadata = &indexed.metadata;
        output.push_str(&format!("{} ({})\n", indexed.id(), indexed.document.title));
        output.push_str(&format!(
            "  Service: {}\n",
            metadata.service.as_deref().unwrap_or("-")
        ));
        output.push_str(&format!(
            "  Version: {}\n",
            metadata.version.as_deref().unwrap_or("-")
        ));
        output.push_str(&format!(
            "  Type:    {}\n",
            metadata.doc_type.as_ref().map(|d| d.as_str()).unwrap_or("-")
        ));
        if !metadata.rate_limits.is_empty() {
            output.push_str(&format!(
                "  Rate limits: {}\n",
                metadata.rate_limits.join(", ")
            ));
        }
        if metadata.deprecated {
            output.push_str("  Mentions deprecation\n");
        }
    }

    if !report.skipped.is_empty() {
        output.push_str(&format!("Skipped: {}\n", report.skipped.join(", ")));
    }
    if !report.fallback.is_empty() {
        output.push_str(&format!(
            "Indexed without metadata: {}\n",
            report.fallback.join(", ")
        ));
    }

    output
}

/// "Authentication API v2.0 (reference)"
pub fn describe(metadata: &MetadataRecord) -> String {
    let mut parts = Vec::new();
    if let Some(service) = &metadata.service {
        parts.push(service.clone());
    }
    if let Some(version) = &metadata.version {
        parts.push(format!("v{}", version));
    }
    if let Some(doc_type) = &metadata.doc_type {
        parts.push(format!("({})", doc_type));
    }
    if parts.is_empty() {
        "(no metadata)".to_string()
    } else {
        parts.join(" ")
    }
}
