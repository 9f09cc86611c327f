//! LLM-backed metadata extraction using an external HTTP service

use super::client::extract_json_object;
use super::{ChatMessage, HttpLLMClient, LLMClient};
use crate::config::LLMServiceConfig;
use crate::corpus::Document;
use crate::error::{MetaragError, Result};
use crate::metadata::{DocType, MetadataExtractor, MetadataRecord, RegexMetadataExtractor};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const MAX_CONTENT_CHARS: usize = 8000;

const SYSTEM_PROMPT: &str = "You extract structured metadata from technical documentation. \
     Respond ONLY with valid JSON matching the requested schema.";

/// Metadata extractor using an external LLM
///
/// Fields the model leaves out are filled from [`RegexMetadataExtractor`].
/// When the LLM call itself fails the regex result is used instead, unless
/// that fallback is disabled.
pub struct HttpMetadataExtractor {
    client: Arc<dyn LLMClient>,
    fallback: RegexMetadataExtractor,
    fallback_on_error: bool,
}

impl HttpMetadataExtractor {
    /// Create from LLM client
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self {
            client,
            fallback: RegexMetadataExtractor::new(),
            fallback_on_error: true,
        }
    }

    /// Create from configuration
    pub fn from_config(config: LLMServiceConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpLLMClient::new(config)?)))
    }

    /// Report LLM failures instead of falling back to regex extraction
    pub fn without_fallback(mut self) -> Self {
        self.fallback_on_error = false;
        self
    }

    async fn extract_with_llm(&self, document: &Document) -> Result<MetadataRecord> {
        let messages = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_extraction_prompt(document)),
        ];
        let response = self.client.chat_completion(messages).await?;
        parse_extraction_response(&response, &document.id)
    }
}

#[async_trait]
impl MetadataExtractor for HttpMetadataExtractor {
    async fn extract(&self, document: &Document) -> Result<MetadataRecord> {
        match self.extract_with_llm(document).await {
            Ok(record) => {
                if record.service.is_some() && record.version.is_some() && record.doc_type.is_some()
                {
                    return Ok(record);
                }
                match self.fallback.extract_sync(document) {
                    Ok(regex_record) => Ok(record.merge_missing(regex_record)),
                    Err(_) => Ok(record),
                }
            }
            Err(e) if self.fallback_on_error && !e.is_timeout() => {
                tracing::warn!(
                    "LLM extraction failed for '{}', using regex extraction: {}",
                    document.id,
                    e
                );
                self.fallback.extract_sync(document)
            }
            Err(e) => Err(MetaragError::ExtractionFailure {
                source_id: document.id.clone(),
                reason: e.to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        self.client.model_name()
    }
}

fn build_extraction_prompt(document: &Document) -> String {
    let content = truncate_chars(&document.content, MAX_CONTENT_CHARS);

    format!(
        r#"Extract these fields from the technical document below:

1. service: the MAIN service or API name from the title (e.g. "Authentication API", "Storage Service")
2. version: the version number ONLY (e.g. "2.0", not "v2.0" or "version 2.0")
3. doc_type: MUST be one of "reference", "guide", "troubleshooting"
4. rate_limits: rate limiting statements, normalized like "100 req/min"
5. deprecated: true if anything is marked as deprecated

Use null for a field you cannot determine.

Example:
Title: Payment API v3.0 Reference
Content: The Payment API handles transactions. Rate limit: 500 requests per minute
Output: {{"service": "Payment API", "version": "3.0", "doc_type": "reference", "rate_limits": ["500 req/min"], "deprecated": false}}

Title: {}
Content:
{}

Output only JSON:"#,
        document.title, content
    )
}

#[derive(Debug, Default, Deserialize)]
struct ExtractionResponse {
    #[serde(default)]
    service: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    doc_type: Option<String>,
    #[serde(default)]
    rate_limits: Vec<String>,
    #[serde(default)]
    deprecated: bool,
}

fn parse_extraction_response(response: &str, source_id: &str) -> Result<MetadataRecord> {
    let json = extract_json_object(response).ok_or_else(|| MetaragError::ExtractionFailure {
        source_id: source_id.to_string(),
        reason: "no JSON object in LLM response".to_string(),
    })?;

    let parsed: ExtractionResponse =
        serde_json::from_str(json).map_err(|e| MetaragError::ExtractionFailure {
            source_id: source_id.to_string(),
            reason: format!("invalid metadata JSON: {}", e),
        })?;

    let mut record = MetadataRecord::empty(source_id);
    record.service = parsed.service.and_then(normalize_value);
    record.version = parsed
        .version
        .and_then(normalize_value)
        .map(|v| normalize_version(&v));
    record.doc_type = parsed
        .doc_type
        .and_then(normalize_value)
        .map(|d| d.parse::<DocType>())
        .and_then(|parsed| parsed.ok());
    record.rate_limits = parsed.rate_limits;
    record.deprecated = parsed.deprecated;
    Ok(record)
}

/// Treat blanks and "unknown" placeholders as absent
fn normalize_value(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unknown") || trimmed == "null" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// "v2.0" / "Version 2.0" → "2.0"
fn normalize_version(version: &str) -> String {
    let lower = version.to_lowercase();
    let stripped = lower
        .strip_prefix("version")
        .or_else(|| lower.strip_prefix('v'))
        .unwrap_or(&lower);
    stripped.trim().to_string()
}

fn truncate_chars(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a canned chat response, or fails like an unavailable service
    struct ScriptedClient {
        reply: Option<String>,
    }

    impl ScriptedClient {
        fn ok(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply.to_string()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { reply: None })
        }
    }

    #[async_trait]
    impl LLMClient for ScriptedClient {
        async fn chat_completion(&self, _messages: Vec<ChatMessage>) -> Result<String> {
            self.reply
                .clone()
                .ok_or_else(|| MetaragError::ExternalError("HTTP 503".to_string()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(Vec::new())
        }

        fn embedding_dimensions(&self) -> usize {
            0
        }

        fn model_name(&self) -> &str {
            "scripted"
        }

        fn embedding_model_name(&self) -> &str {
            "scripted"
        }
    }

    fn auth_doc() -> Document {
        Document::new(
            "auth_v2",
            "Authentication API Reference v2.0",
            "Standard tier: 100 requests per minute",
        )
    }

    #[tokio::test]
    async fn test_llm_fields_used() {
        let client = ScriptedClient::ok(
            "```json\n{\"service\": \"Authentication API\", \"version\": \"v2.0\", \
             \"doc_type\": \"Reference\", \"rate_limits\": [\"100 req/min\"], \"deprecated\": true}\n```",
        );
        let record = HttpMetadataExtractor::new(client)
            .extract(&auth_doc())
            .await
            .unwrap();

        assert_eq!(record.service.as_deref(), Some("Authentication API"));
        assert_eq!(record.version.as_deref(), Some("2.0"));
        assert_eq!(record.doc_type, Some(DocType::Reference));
        assert!(record.deprecated);
    }

    #[tokio::test]
    async fn test_missing_fields_filled_from_regex() {
        let client = ScriptedClient::ok("{\"service\": \"unknown\", \"doc_type\": \"guide\"}");
        let record = HttpMetadataExtractor::new(client)
            .extract(&auth_doc())
            .await
            .unwrap();

        assert_eq!(record.service.as_deref(), Some("Authentication API"));
        assert_eq!(record.version.as_deref(), Some("2.0"));
        assert_eq!(record.doc_type, Some(DocType::Guide));
        assert_eq!(record.rate_limits, vec!["100 req/min".to_string()]);
    }

    #[tokio::test]
    async fn test_llm_failure_falls_back_to_regex() {
        let record = HttpMetadataExtractor::new(ScriptedClient::failing())
            .extract(&auth_doc())
            .await
            .unwrap();

        assert_eq!(record.service.as_deref(), Some("Authentication API"));
        assert_eq!(record.version.as_deref(), Some("2.0"));
    }

    #[tokio::test]
    async fn test_llm_failure_without_fallback() {
        let err = HttpMetadataExtractor::new(ScriptedClient::failing())
            .without_fallback()
            .extract(&auth_doc())
            .await
            .unwrap_err();

        assert!(matches!(err, MetaragError::ExtractionFailure { .. }));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            parse_extraction_response("I could not find anything", "x"),
            Err(MetaragError::ExtractionFailure { .. })
        ));
    }

    #[test]
    fn test_normalize_version() {
        assert_eq!(normalize_version("v2.0"), "2.0");
        assert_eq!(normalize_version("Version 3.1"), "3.1");
        assert_eq!(normalize_version("1.0"), "1.0");
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_prompt_contains_document() {
        let prompt = build_extraction_prompt(&auth_doc());
        assert!(prompt.contains("Title: Authentication API Reference v2.0"));
        assert!(prompt.contains("100 requests per minute"));
    }
}
