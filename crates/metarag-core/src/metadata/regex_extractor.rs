//! Pattern-based metadata extraction

use super::{DocType, MetadataExtractor, MetadataRecord};
use crate::corpus::Document;
use crate::error::{MetaragError, Result};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HEADING_RE: Regex = Regex::new(r"^#{1,2}\s+(.+)$").unwrap();
    static ref SERVICE_RE: Regex = Regex::new(r"([\w\s]+(?:API|Service))").unwrap();
    static ref PREFIXED_VERSION_RE: Regex =
        Regex::new(r"(?i)\bv(?:ersion)?\s*(\d+(?:\.\d+)*)").unwrap();
    static ref BARE_VERSION_RE: Regex = Regex::new(r"\b(\d+\.\d+(?:\.\d+)*)\b").unwrap();
    static ref RATE_LIMIT_RE: Regex =
        Regex::new(r"(\d+)\s*(?:requests?|req)[/\s]*(?:per\s*)?min").unwrap();
}

/// Extract title from markdown content, falling back to the first line
pub fn extract_title(content: &str) -> Option<String> {
    content
        .lines()
        .take(50)
        .find_map(|line| HEADING_RE.captures(line.trim_end()))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .or_else(|| {
            content
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(str::to_string)
        })
}

/// Deterministic extractor working from the title and body text
///
/// Service and version come from the title, doc_type from title keywords
/// (defaulting to reference), rate limits and deprecation from the body.
#[derive(Debug, Clone, Default)]
pub struct RegexMetadataExtractor;

impl RegexMetadataExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous extraction, also used as the LLM extractor's fallback
    pub fn extract_sync(&self, document: &Document) -> Result<MetadataRecord> {
        if document.content.trim().is_empty() {
            return Err(MetaragError::ExtractionFailure {
                source_id: document.id.clone(),
                reason: "document has no content".to_string(),
            });
        }

        let title = if document.title.trim().is_empty() {
            extract_title(&document.content).unwrap_or_default()
        } else {
            document.title.clone()
        };

        let mut record = MetadataRecord::empty(&document.id);

        record.service = SERVICE_RE
            .captures(&title)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty());

        record.version = extract_version(&title);

        let title_lower = title.to_lowercase();
        record.doc_type = Some(if title_lower.contains("troubleshooting") {
            DocType::Troubleshooting
        } else if title_lower.contains("guide") {
            DocType::Guide
        } else {
            DocType::Reference
        });

        let content_lower = document.content.to_lowercase();
        record.rate_limits = RATE_LIMIT_RE
            .captures_iter(&content_lower)
            .filter_map(|caps| caps.get(1))
            .map(|m| format!("{} req/min", m.as_str()))
            .collect();
        record.deprecated = content_lower.contains("deprecated");

        Ok(record)
    }
}

/// Version number from a title: "v2.0" / "version 2" first, then a bare dotted number
fn extract_version(title: &str) -> Option<String> {
    PREFIXED_VERSION_RE
        .captures(title)
        .or_else(|| BARE_VERSION_RE.captures(title))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[async_trait]
impl MetadataExtractor for RegexMetadataExtractor {
    async fn extract(&self, document: &Document) -> Result<MetadataRecord> {
        self.extract_sync(document)
    }

    fn name(&self) -> &str {
        "regex"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, title: &str, content: &str) -> Document {
        Document::new(id, title, content)
    }

    #[test]
    fn test_reference_with_version() {
        let record = RegexMetadataExtractor::new()
            .extract_sync(&doc(
                "auth_v2",
                "Authentication API Reference v2.0",
                "# Authentication API v2.0\n\n- Standard tier: 100 requests per minute\n\
                 Note: API key authentication is deprecated as of v2.0.",
            ))
            .unwrap();

        assert_eq!(record.source_id, "auth_v2");
        assert_eq!(record.service.as_deref(), Some("Authentication API"));
        assert_eq!(record.version.as_deref(), Some("2.0"));
        assert_eq!(record.doc_type, Some(DocType::Reference));
        assert_eq!(record.rate_limits, vec!["100 req/min".to_string()]);
        assert!(record.deprecated);
    }

    #[test]
    fn test_guide_without_version() {
        let record = RegexMetadataExtractor::new()
            .extract_sync(&doc(
                "storage",
                "Storage Service Guide",
                "Standard storage: $0.023 per GB/month",
            ))
            .unwrap();

        assert_eq!(record.service.as_deref(), Some("Storage Service"));
        assert_eq!(record.version, None);
        assert_eq!(record.doc_type, Some(DocType::Guide));
        assert!(!record.deprecated);
    }

    #[test]
    fn test_troubleshooting_title_has_no_service() {
        let record = RegexMetadataExtractor::new()
            .extract_sync(&doc(
                "troubleshooting",
                "Troubleshooting Guide: Authentication Errors",
                "Standard tier allows 100 req/min",
            ))
            .unwrap();

        assert_eq!(record.service, None);
        assert_eq!(record.doc_type, Some(DocType::Troubleshooting));
        assert_eq!(record.rate_limits, vec!["100 req/min".to_string()]);
    }

    #[test]
    fn test_title_from_content_heading() {
        let record = RegexMetadataExtractor::new()
            .extract_sync(&doc("p", "", "# Payment API 3.1.4\n\nBody"))
            .unwrap();

        assert_eq!(record.service.as_deref(), Some("Payment API"));
        assert_eq!(record.version.as_deref(), Some("3.1.4"));
    }

    #[test]
    fn test_blank_document_fails() {
        let err = RegexMetadataExtractor::new()
            .extract_sync(&doc("blank", "Title", "   \n"))
            .unwrap_err();

        assert!(matches!(
            err,
            MetaragError::ExtractionFailure { ref source_id, .. } if source_id == "blank"
        ));
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(
            extract_title("intro\n## Second Level\ntext"),
            Some("Second Level".to_string())
        );
        assert_eq!(extract_title("plain first line\nmore"), Some("plain first line".to_string()));
        assert_eq!(extract_title("  \n"), None);
    }
}
