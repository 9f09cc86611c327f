//! CLI command handlers

pub mod demo;
pub mod filters;
pub mod metadata;
pub mod query;

use anyhow::{Context, Result};
use metarag_core::{
    ingest_documents, load_documents, sample_documents, Config, Corpus, Embedder, HttpEmbedder,
    HttpLLMClient, HttpMetadataExtractor, IngestReport, KeywordSearch, LLMClient,
    MetadataExtractor, RegexMetadataExtractor, SimilaritySearch, VectorSearch,
};
use std::path::Path;
use std::sync::Arc;

/// Load config from an explicit path, or from the usual locations
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load()?,
    };
    Ok(config)
}

/// Collaborators chosen from the config
///
/// With an LLM service configured, metadata comes from the LLM and search is
/// embedding-based; otherwise regex extraction and keyword search are used.
pub struct Services {
    pub extractor: Box<dyn MetadataExtractor>,
    pub embedder: Option<Arc<dyn Embedder>>,
    pub searcher: Arc<dyn SimilaritySearch>,
}

impl Services {
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.llm_service() {
            Some(llm) => {
                tracing::info!("Using LLM service at {} ({})", llm.url, llm.model);
                let client: Arc<dyn LLMClient> = Arc::new(HttpLLMClient::new(llm)?);
                let embedder: Arc<dyn Embedder> = Arc::new(HttpEmbedder::new(client.clone()));
                Ok(Self {
                    extractor: Box::new(HttpMetadataExtractor::new(client)),
                    embedder: Some(embedder.clone()),
                    searcher: Arc::new(VectorSearch::new(embedder)),
                })
            }
            None => Ok(Self {
                extractor: Box::new(RegexMetadataExtractor::new()),
                embedder: None,
                searcher: Arc::new(KeywordSearch::new()),
            }),
        }
    }
}

/// Load documents and ingest them into a corpus
pub async fn build_corpus(
    config: &Config,
    services: &Services,
    docs: Option<&Path>,
) -> Result<(Corpus, IngestReport)> {
    let documents = match docs {
        Some(path) => load_documents(path)
            .with_context(|| format!("Failed to load documents from {}", path.display()))?,
        None => sample_documents(),
    };

    Ok(ingest_documents(
        documents,
        services.extractor.as_ref(),
        services.embedder.as_deref(),
        &config.ingest,
    )
    .await)
}
