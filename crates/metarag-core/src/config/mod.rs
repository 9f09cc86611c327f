//! Configuration management

use crate::error::{MetaragError, Result};
use crate::filter::FilterRules;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "METARAG_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// External LLM service; without one, regex extraction and keyword search are used
    #[serde(default)]
    pub llm_service: Option<LLMServiceConfig>,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    /// Keyword tables for query filter extraction
    #[serde(default)]
    pub filter_rules: FilterRules,
}

/// LLM service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the LLM service for chat/completions
    pub url: String,

    /// Model name for chat completions (metadata extraction)
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Base URL for embeddings service (can be different from LLM URL)
    #[serde(default)]
    pub embedding_url: Option<String>,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding dimensions (defaults to 384 if not specified)
    #[serde(default)]
    pub embedding_dimensions: Option<usize>,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl LLMServiceConfig {
    /// Config pointing at `url` with every other field defaulted
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            model: default_chat_model(),
            embedding_url: None,
            embedding_model: default_embedding_model(),
            embedding_dimensions: None,
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }

    /// Build from `METARAG_*` environment variables; `None` unless `METARAG_LLM_URL` is set
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("METARAG_LLM_URL").ok()?;
        Some(Self {
            embedding_url: std::env::var("METARAG_EMBEDDING_URL").ok(),
            embedding_dimensions: std::env::var("METARAG_EMBEDDING_DIMS")
                .ok()
                .and_then(|s| s.parse().ok()),
            api_key: std::env::var("METARAG_LLM_API_KEY").ok(),
            ..Self::new(url)
        })
    }

    /// Get the embeddings URL (falls back to main URL if not specified)
    pub fn embeddings_url(&self) -> &str {
        self.embedding_url.as_deref().unwrap_or(&self.url)
    }
}

fn default_chat_model() -> String {
    std::env::var("METARAG_LLM_MODEL")
        .unwrap_or_else(|_| "meta-llama/Llama-3.1-8B-Instruct".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("METARAG_EMBEDDING_MODEL")
        .unwrap_or_else(|_| "sentence-transformers/all-MiniLM-L6-v2".to_string())
}

fn default_timeout() -> u64 {
    30
}

/// Query pipeline options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum number of ranked results
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Minimum score threshold
    #[serde(default)]
    pub min_score: f64,

    /// Drop the least specific criterion and retry once when nothing matches
    #[serde(default)]
    pub broaden_on_empty: bool,

    /// Retry a timed-out search call once
    #[serde(default)]
    pub retry_on_timeout: bool,

    /// Time allotted to each collaborator call, in seconds
    #[serde(default = "default_timeout")]
    pub collaborator_timeout_secs: u64,
}

fn default_limit() -> usize {
    10
}

impl PipelineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.collaborator_timeout_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            min_score: 0.0,
            broaden_on_empty: false,
            retry_on_timeout: false,
            collaborator_timeout_secs: default_timeout(),
        }
    }
}

/// What ingestion does with a document whose metadata could not be extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionFailurePolicy {
    /// Leave the document out of the corpus
    #[default]
    Skip,
    /// Index it with an all-absent metadata record
    EmptyRecord,
}

/// Corpus ingestion options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default)]
    pub on_extraction_failure: ExtractionFailurePolicy,

    /// Time allotted to each extraction or embedding call, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retry a timed-out extraction once
    #[serde(default)]
    pub retry_on_timeout: bool,
}

impl IngestConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            on_extraction_failure: ExtractionFailurePolicy::default(),
            timeout_secs: default_timeout(),
            retry_on_timeout: false,
        }
    }
}

impl Config {
    /// Load config from `METARAG_CONFIG` or the default path; a missing file yields defaults
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());
        Self::load_from(&path)
    }

    /// Load config from a specific path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a path
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// LLM service from the config file, else from the environment
    pub fn llm_service(&self) -> Option<LLMServiceConfig> {
        self.llm_service.clone().or_else(LLMServiceConfig::from_env)
    }

    fn validate(&self) -> Result<()> {
        if self.pipeline.limit == 0 {
            return Err(MetaragError::Config(
                "pipeline.limit must be at least 1".to_string(),
            ));
        }
        if self.pipeline.collaborator_timeout_secs == 0 || self.ingest.timeout_secs == 0 {
            return Err(MetaragError::Config(
                "timeouts must be at least 1 second".to_string(),
            ));
        }
        self.filter_rules.validate()
    }
}
