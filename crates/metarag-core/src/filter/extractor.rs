//! Rule-based query filter extraction
//!
//! Turns a natural-language query into [`FilterCriteria`] with deterministic
//! rules. Each field is populated by the first rule that fires, in declaration
//! order; the version rule takes the leftmost version token in the query.

use super::FilterCriteria;
use crate::error::{MetaragError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref VERSION_RE: Regex = Regex::new(r"(?i)\bv(?:ersion)?\s*(\d+(?:\.\d+)*)").unwrap();
}

/// Maps query words to one criterion value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    /// Criterion value set when the rule fires
    pub value: String,

    /// Whole words or multi-word phrases, matched case-insensitively
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Word prefixes, e.g. "troubleshoot" also matches "troubleshooting"
    #[serde(default)]
    pub prefixes: Vec<String>,
}

impl KeywordRule {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            keywords: Vec::new(),
            prefixes: Vec::new(),
        }
    }

    pub fn keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn prefixes(mut self, prefixes: &[&str]) -> Self {
        self.prefixes = prefixes.iter().map(|p| p.to_string()).collect();
        self
    }

    fn matches(&self, words: &[String]) -> bool {
        let keyword_hit = self.keywords.iter().any(|keyword| {
            let phrase = tokenize(keyword);
            !phrase.is_empty()
                && words
                    .windows(phrase.len())
                    .any(|window| window == phrase.as_slice())
        });

        keyword_hit
            || self.prefixes.iter().any(|prefix| {
                let prefix = prefix.to_lowercase();
                !prefix.is_empty() && words.iter().any(|word| word.starts_with(&prefix))
            })
    }
}

/// Keyword tables used by [`QueryFilterExtractor`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRules {
    #[serde(default)]
    pub services: Vec<KeywordRule>,

    #[serde(default)]
    pub doc_types: Vec<KeywordRule>,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            services: vec![
                KeywordRule::new("Authentication API").keywords(&["auth", "authentication"]),
                KeywordRule::new("Storage Service").keywords(&["storage"]),
            ],
            doc_types: vec![
                KeywordRule::new("troubleshooting")
                    .keywords(&["error", "errors"])
                    .prefixes(&["troubleshoot", "fix"]),
                KeywordRule::new("guide").keywords(&["guide", "tutorial", "how to"]),
                KeywordRule::new("reference").keywords(&["reference"]),
            ],
        }
    }
}

impl FilterRules {
    /// Reject rules that could never fire or would set an empty value
    pub fn validate(&self) -> Result<()> {
        for rule in self.services.iter().chain(&self.doc_types) {
            if rule.value.trim().is_empty() {
                return Err(MetaragError::Config(
                    "filter rule with empty value".to_string(),
                ));
            }
            let has_trigger = rule.keywords.iter().any(|k| !tokenize(k).is_empty())
                || rule.prefixes.iter().any(|p| !p.trim().is_empty());
            if !has_trigger {
                return Err(MetaragError::Config(format!(
                    "filter rule '{}' has no keywords or prefixes",
                    rule.value
                )));
            }
        }
        Ok(())
    }
}

/// Deterministic query → criteria extraction
#[derive(Debug, Clone, Default)]
pub struct QueryFilterExtractor {
    rules: FilterRules,
}

impl QueryFilterExtractor {
    pub fn new(rules: FilterRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &FilterRules {
        &self.rules
    }

    /// Extract criteria from a query; unrecognized queries yield all-absent criteria
    pub fn extract(&self, query: &str) -> FilterCriteria {
        let words = tokenize(query);

        let criteria = FilterCriteria {
            service: first_match(&self.rules.services, &words),
            version: extract_version(query),
            doc_type: first_match(&self.rules.doc_types, &words),
        };

        tracing::debug!("Extracted filters from '{}': {}", query, criteria);
        criteria
    }
}

fn first_match(rules: &[KeywordRule], words: &[String]) -> Option<String> {
    rules
        .iter()
        .find(|rule| rule.matches(words))
        .map(|rule| rule.value.clone())
}

/// Leftmost "v2.0" / "version 2.0" token, as a bare dotted number
pub fn extract_version(query: &str) -> Option<String> {
    VERSION_RE
        .captures(query)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Lowercase alphanumeric words
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
