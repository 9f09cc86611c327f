//! Metadata filter
//!
//! Provides:
//! - Query filter extraction with deterministic keyword and version rules
//! - Stable, metadata-based subset selection over the corpus

mod criteria;
mod extractor;
mod selector;

pub use criteria::{FilterCriteria, MetadataField};
pub use extractor::{extract_version, FilterRules, KeywordRule, QueryFilterExtractor};
pub use selector::{matches_criteria, select_candidates, Selection};
