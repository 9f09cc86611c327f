//! Document corpus
//!
//! The corpus is built once at ingestion time and read-only while queries run.
//! Documents keep their ingestion order; every downstream stage preserves it.

mod ingest;
mod samples;

pub use ingest::{ingest_documents, IngestReport};
pub use samples::{sample_documents, SAMPLE_QUERIES};

use crate::error::{MetaragError, Result};
use crate::metadata::MetadataRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Raw document as loaded from a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Stable source identifier
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub content: String,
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }

    /// SHA-256 of the content, hex encoded
    pub fn content_hash(&self) -> String {
        hash_content(&self.content)
    }
}

/// Hash content using SHA-256
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Load documents from a JSON or YAML file containing a list of documents
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let content = std::fs::read_to_string(path)?;
    let documents: Vec<Document> = match path.extension().and_then(|e| e.to_str()) {
        Some("yml") | Some("yaml") => serde_yaml::from_str(&content)?,
        Some("json") => serde_json::from_str(&content)?,
        other => {
            return Err(MetaragError::InvalidInput(format!(
                "Unsupported document file extension: {}",
                other.unwrap_or("<none>")
            )))
        }
    };

    for doc in &documents {
        if doc.id.trim().is_empty() {
            return Err(MetaragError::InvalidInput(format!(
                "Document without id in {}",
                path.display()
            )));
        }
    }

    Ok(documents)
}

/// Document with the metadata derived for it at ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub document: Document,
    pub metadata: MetadataRecord,
    /// SHA-256 of the content at ingestion time
    pub hash: String,
    pub indexed_at: DateTime<Utc>,
    /// Precomputed embedding, if an embedder was available at ingestion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl IndexedDocument {
    pub fn new(document: Document, metadata: MetadataRecord) -> Self {
        let hash = document.content_hash();
        Self {
            document,
            metadata,
            hash,
            indexed_at: Utc::now(),
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn id(&self) -> &str {
        &self.document.id
    }
}

/// Read interface over the corpus
pub trait CorpusStore: Send + Sync {
    /// Every indexed document in ingestion order
    fn all_documents(&self) -> &[IndexedDocument];

    fn len(&self) -> usize {
        self.all_documents().len()
    }

    fn is_empty(&self) -> bool {
        self.all_documents().is_empty()
    }
}

/// Append-only in-memory corpus
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    documents: Vec<IndexedDocument>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document; ids must be unique
    pub fn push(&mut self, document: IndexedDocument) -> Result<()> {
        if self.get(document.id()).is_some() {
            return Err(MetaragError::InvalidInput(format!(
                "Duplicate document id: {}",
                document.id()
            )));
        }
        self.documents.push(document);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&IndexedDocument> {
        self.documents.iter().find(|d| d.id() == id)
    }

    /// Save the corpus snapshot as JSON
    pub fn save_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load a corpus snapshot written by [`Corpus::save_json`]
    ///
    /// Documents are re-appended one by one, so a snapshot with duplicate ids
    /// is rejected.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: Corpus = serde_json::from_str(&content)?;

        let mut corpus = Corpus::new();
        for document in snapshot.documents {
            corpus.push(document)?;
        }
        Ok(corpus)
    }
}

impl CorpusStore for Corpus {
    fn all_documents(&self) -> &[IndexedDocument] {
        &self.documents
    }
}

impl FromIterator<IndexedDocument> for Corpus {
    fn from_iter<I: IntoIterator<Item = IndexedDocument>>(iter: I) -> Self {
        let mut corpus = Corpus::new();
        for document in iter {
            if let Err(e) = corpus.push(document) {
                tracing::warn!("Skipping document: {}", e);
            }
        }
        corpus
    }
}
