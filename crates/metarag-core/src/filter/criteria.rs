//! Per-query filter criteria

use serde::{Deserialize, Serialize};
use std::fmt;

/// Filterable metadata field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    Service,
    Version,
    DocType,
}

impl MetadataField {
    /// Order in which criteria are dropped when broadening a query
    pub const LEAST_SPECIFIC_FIRST: [MetadataField; 3] =
        [Self::DocType, Self::Service, Self::Version];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Version => "version",
            Self::DocType => "doc_type",
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraints derived from one query
///
/// An absent field places no constraint. All-absent criteria select the whole corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    /// Matched exactly (case-insensitive), never by prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    pub fn get(&self, field: MetadataField) -> Option<&str> {
        match field {
            MetadataField::Service => self.service.as_deref(),
            MetadataField::Version => self.version.as_deref(),
            MetadataField::DocType => self.doc_type.as_deref(),
        }
    }

    fn clear(&mut self, field: MetadataField) {
        match field {
            MetadataField::Service => self.service = None,
            MetadataField::Version => self.version = None,
            MetadataField::DocType => self.doc_type = None,
        }
    }

    /// No field is constrained
    pub fn is_unconstrained(&self) -> bool {
        self.constrained_fields().is_empty()
    }

    /// Constrained fields in declaration order
    pub fn constrained_fields(&self) -> Vec<MetadataField> {
        [
            MetadataField::Service,
            MetadataField::Version,
            MetadataField::DocType,
        ]
        .into_iter()
        .filter(|field| self.get(*field).is_some())
        .collect()
    }

    /// Copy with the least specific constrained field removed
    ///
    /// Returns `None` when nothing is constrained.
    pub fn broaden(&self) -> Option<(FilterCriteria, MetadataField)> {
        let field = MetadataField::LEAST_SPECIFIC_FIRST
            .into_iter()
            .find(|field| self.get(*field).is_some())?;
        let mut broader = self.clone();
        broader.clear(field);
        Some((broader, field))
    }
}

impl fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .constrained_fields()
            .into_iter()
            .filter_map(|field| self.get(field).map(|value| format!("{}={}", field, value)))
            .collect();

        if parts.is_empty() {
            f.write_str("(none)")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}
