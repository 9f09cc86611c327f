//! Output formatters

pub mod json;
pub mod terminal;

use crate::app::OutputFormat;
use metarag_core::{Corpus, FilterCriteria, IngestReport, QueryOutcome};

/// Characters of content shown per hit
pub const SNIPPET_LEN: usize = 160;

/// Format the result of one query
pub fn format_outcome(outcome: &QueryOutcome, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::to_pretty(&json::outcome_value(outcome)),
        OutputFormat::Cli => terminal::format_outcome(outcome),
    }
}

/// Format criteria extracted from a query
pub fn format_criteria(query: &str, criteria: &FilterCriteria, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::to_pretty(&json::criteria_value(query, criteria)),
        OutputFormat::Cli => terminal::format_criteria(query, criteria),
    }
}

/// Format the metadata of every indexed document
pub fn format_metadata(corpus: &Corpus, report: &IngestReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::to_pretty(&json::metadata_value(corpus, report)),
        OutputFormat::Cli => terminal::format_metadata(corpus, report),
    }
}
