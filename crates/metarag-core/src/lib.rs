//! Metarag Core Library
//!
//! Metadata-filtered retrieval: narrow a document corpus by structured
//! metadata derived from the query before handing it to similarity search.
//!
//! # Features
//! - Rule-based query filter extraction (service, version, document type)
//! - Stable metadata subset selection with an explicit no-match outcome
//! - Regex and LLM-backed metadata extraction at ingestion time
//! - Keyword and embedding-based similarity search
//! - Content-addressable documents with SHA-256

pub mod config;
pub mod corpus;
pub mod error;
pub mod filter;
pub mod llm;
pub mod metadata;
pub mod pipeline;
pub mod search;

pub use config::{Config, ExtractionFailurePolicy, IngestConfig, LLMServiceConfig, PipelineConfig};
pub use corpus::{
    ingest_documents, load_documents, sample_documents, Corpus, CorpusStore, Document,
    IndexedDocument, IngestReport, SAMPLE_QUERIES,
};
pub use error::{Error, MetaragError, Result};
pub use filter::{
    select_candidates, FilterCriteria, FilterRules, MetadataField, QueryFilterExtractor, Selection,
};
pub use llm::{
    ChatMessage, Embedder, HttpEmbedder, HttpLLMClient, HttpMetadataExtractor, LLMClient,
    MetricsSnapshot,
};
pub use metadata::{DocType, MetadataExtractor, MetadataRecord, RegexMetadataExtractor};
pub use pipeline::{CancelFlag, Pipeline, PipelineStage, QueryOutcome, RankedResults};
pub use search::{KeywordSearch, ScoredDocument, SearchSource, SimilaritySearch, VectorSearch};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "metarag";
