//! LLM integration
//!
//! Provides traits and implementations for:
//! - Embedding generation via external services (vLLM, OpenAI, etc.)
//! - Document metadata extraction

mod cache;
mod client;
mod http_embedder;
mod http_metadata_extractor;
mod traits;

pub use cache::ResponseCache;
pub use client::{extract_json_object, ChatMessage, HttpLLMClient, LLMClient, MetricsSnapshot};
pub use http_embedder::HttpEmbedder;
pub use http_metadata_extractor::HttpMetadataExtractor;
pub use traits::*;
