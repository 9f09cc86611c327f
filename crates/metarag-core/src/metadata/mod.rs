//! Document metadata records
//!
//! A [`MetadataRecord`] is derived once per document at ingestion time by a
//! [`MetadataExtractor`] and never mutated afterwards.

mod regex_extractor;

pub use regex_extractor::{extract_title, RegexMetadataExtractor};

use crate::corpus::Document;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Metadata extraction collaborator
///
/// Called once per document while the corpus is built. Implementations report
/// unextractable documents with [`crate::MetaragError::ExtractionFailure`];
/// ingestion recovers from that locally.
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    /// Derive the metadata record for a document
    async fn extract(&self, document: &Document) -> Result<MetadataRecord>;

    /// Name shown in logs
    fn name(&self) -> &str;
}

/// Document category
///
/// Open set: unknown categories are kept verbatim (lowercased) in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocType {
    Reference,
    Guide,
    Troubleshooting,
    Other(String),
}

impl DocType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Reference => "reference",
            Self::Guide => "guide",
            Self::Troubleshooting => "troubleshooting",
            Self::Other(s) => s,
        }
    }
}

impl FromStr for DocType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Ok(match normalized.as_str() {
            "reference" => Self::Reference,
            "guide" => Self::Guide,
            "troubleshooting" => Self::Troubleshooting,
            _ => Self::Other(normalized),
        })
    }
}

impl From<String> for DocType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(doc_type) => doc_type,
            Err(never) => match never {},
        }
    }
}

impl From<DocType> for String {
    fn from(doc_type: DocType) -> Self {
        doc_type.as_str().to_string()
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured metadata attached to one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Stable identifier of the originating document
    pub source_id: String,

    /// Main service or API the document covers (e.g. "Authentication API")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    /// Bare version number (e.g. "2.0")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<DocType>,

    /// Normalized rate limit mentions, e.g. "100 req/min"
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rate_limits: Vec<String>,

    /// Whether the document mentions deprecation
    #[serde(default)]
    pub deprecated: bool,
}

impl MetadataRecord {
    /// Record with every filterable field absent
    pub fn empty(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            service: None,
            version: None,
            doc_type: None,
            rate_limits: Vec::new(),
            deprecated: false,
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_doc_type(mut self, doc_type: DocType) -> Self {
        self.doc_type = Some(doc_type);
        self
    }

    /// True when none of service, version or doc_type is known
    pub fn is_empty(&self) -> bool {
        self.service.is_none() && self.version.is_none() && self.doc_type.is_none()
    }

    /// Fill absent fields from another record, keeping values already present
    pub fn merge_missing(mut self, fallback: MetadataRecord) -> Self {
        if self.service.is_none() {
            self.service = fallback.service;
        }
        if self.version.is_none() {
            self.version = fallback.version;
        }
        if self.doc_type.is_none() {
            self.doc_type = fallback.doc_type;
        }
        if self.rate_limits.is_empty() {
            self.rate_limits = fallback.rate_limits;
        }
        self.deprecated |= fallback.deprecated;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_type_parse() {
        assert_eq!("Reference".parse::<DocType>().unwrap(), DocType::Reference);
        assert_eq!(" GUIDE ".parse::<DocType>().unwrap(), DocType::Guide);
        assert_eq!(
            "troubleshooting".parse::<DocType>().unwrap(),
            DocType::Troubleshooting
        );
        assert_eq!(
            "Changelog".parse::<DocType>().unwrap(),
            DocType::Other("changelog".to_string())
        );
    }

    #[test]
    fn test_doc_type_serializes_lowercase() {
        let json = serde_json::to_string(&DocType::Troubleshooting).unwrap();
        assert_eq!(json, "\"troubleshooting\"");

        let parsed: DocType = serde_json::from_str("\"Guide\"").unwrap();
        assert_eq!(parsed, DocType::Guide);
    }

    #[test]
    fn test_record_json_omits_absent_fields() {
        let record = MetadataRecord::empty("auth_v2").with_version("2.0");
        let json = serde_json::to_string(&record).unwrap();

        assert!(json.contains("\"version\":\"2.0\""));
        assert!(!json.contains("service"));
        assert!(!json.contains("doc_type"));

        let parsed: MetadataRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_merge_missing_keeps_present_values() {
        let primary = MetadataRecord::empty("a").with_service("Payment API");
        let fallback = MetadataRecord::empty("a")
            .with_service("Billing Service")
            .with_version("3.0")
            .with_doc_type(DocType::Guide);

        let merged = primary.merge_missing(fallback);
        assert_eq!(merged.service.as_deref(), Some("Payment API"));
        assert_eq!(merged.version.as_deref(), Some("3.0"));
        assert_eq!(merged.doc_type, Some(DocType::Guide));
    }

    #[test]
    fn test_empty_record() {
        let record = MetadataRecord::empty("x");
        assert!(record.is_empty());
        assert!(!record.with_version("1.0").is_empty());
    }
}
