//! Metadata-based subset selection
//!
//! Stable filter over the corpus. `service` and `doc_type` match on
//! case-insensitive equality or substring containment; `version` matches on
//! case-insensitive equality only, so "2.0" never selects "2.0.1". A document
//! lacking a constrained field is excluded.

use super::{FilterCriteria, MetadataField};
use crate::corpus::IndexedDocument;
use crate::error::{MetaragError, Result};
use crate::metadata::MetadataRecord;

/// Outcome of narrowing the corpus
#[derive(Debug, Clone)]
pub enum Selection<'a> {
    /// Non-empty subset in corpus order
    Candidates(Vec<&'a IndexedDocument>),
    /// Nothing satisfied the criteria
    NoMatch,
}

impl<'a> Selection<'a> {
    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch)
    }

    pub fn len(&self) -> usize {
        self.documents().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents().is_empty()
    }

    pub fn documents(&self) -> &[&'a IndexedDocument] {
        match self {
            Self::Candidates(docs) => docs,
            Self::NoMatch => &[],
        }
    }

    /// Candidates, or [`MetaragError::EmptyFilterResult`] naming the criteria
    pub fn into_result(self, criteria: &FilterCriteria) -> Result<Vec<&'a IndexedDocument>> {
        match self {
            Self::Candidates(docs) => Ok(docs),
            Self::NoMatch => Err(MetaragError::EmptyFilterResult(criteria.to_string())),
        }
    }
}

/// Narrow `documents` to those satisfying every constrained field of `criteria`
pub fn select_candidates<'a>(
    documents: &'a [IndexedDocument],
    criteria: &FilterCriteria,
) -> Selection<'a> {
    let selected: Vec<&IndexedDocument> = documents
        .iter()
        .filter(|doc| matches_criteria(&doc.metadata, criteria))
        .collect();

    tracing::info!(
        "Metadata filter {} applied: {} → {} documents",
        criteria,
        documents.len(),
        selected.len()
    );

    if selected.is_empty() {
        Selection::NoMatch
    } else {
        Selection::Candidates(selected)
    }
}

/// Whether one metadata record satisfies the criteria
pub fn matches_criteria(metadata: &MetadataRecord, criteria: &FilterCriteria) -> bool {
    criteria.constrained_fields().into_iter().all(|field| {
        let Some(wanted) = criteria.get(field) else {
            return true;
        };
        match field {
            MetadataField::Service => metadata
                .service
                .as_deref()
                .is_some_and(|value| contains_ignore_case(value, wanted)),
            MetadataField::DocType => metadata
                .doc_type
                .as_ref()
                .is_some_and(|value| contains_ignore_case(value.as_str(), wanted)),
            MetadataField::Version => metadata
                .version
                .as_deref()
                .is_some_and(|value| value.trim().eq_ignore_ascii_case(wanted.trim())),
        }
    })
}

/// Case-insensitive equality or substring containment of `needle` in `value`
fn contains_ignore_case(value: &str, needle: &str) -> bool {
    let value = value.to_lowercase();
    let needle = needle.to_lowercase();
    value == needle || value.contains(&needle)
}
