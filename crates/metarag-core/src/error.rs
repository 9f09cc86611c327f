//! Error types for metarag

use std::time::Duration;
use thiserror::Error;

/// Result type alias using MetaragError
pub type Result<T> = std::result::Result<T, MetaragError>;

/// Error type alias for convenience
pub type Error = MetaragError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NO_MATCH: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
    pub const TIMEOUT: i32 = 4;
}

/// Main error type for metarag
#[derive(Debug, Error)]
pub enum MetaragError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata for a single document could not be derived
    #[error("Extraction failed for document '{source_id}': {reason}")]
    ExtractionFailure { source_id: String, reason: String },

    /// No document satisfied the active filter criteria
    #[error("No documents matched filter criteria: {0}")]
    EmptyFilterResult(String),

    /// An external collaborator did not answer in time
    #[error("{operation} timed out after {}s", .timeout.as_secs_f64())]
    CollaboratorTimeout {
        operation: String,
        timeout: Duration,
    },

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External service error: {0}")]
    ExternalError(String),
}

impl MetaragError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::EmptyFilterResult(_) => exit_codes::NO_MATCH,
            Self::InvalidInput(_) | Self::Config(_) => exit_codes::INVALID_INPUT,
            Self::CollaboratorTimeout { .. } => exit_codes::TIMEOUT,
            _ => exit_codes::GENERAL_ERROR,
        }
    }

    /// Whether a bounded retry may reasonably succeed
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::CollaboratorTimeout { .. })
    }
}
