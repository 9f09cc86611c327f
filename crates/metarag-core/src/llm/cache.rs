//! In-memory response cache for LLM and embedding calls

use crate::corpus::hash_content;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, SystemTime};

const DEFAULT_TTL: Duration = Duration::from_secs(3600);
const DEFAULT_MAX_ENTRIES: usize = 10_000;

#[derive(Clone)]
struct CacheEntry {
    value: String,
    expires_at: SystemTime,
}

/// TTL cache keyed by model and request content
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
}

impl ResponseCache {
    /// Cache with a one hour TTL
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    /// Get cached value if present and not expired
    pub fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;

        if SystemTime::now() < entry.expires_at {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Store a value; expired entries are purged when the cache is full
    pub fn set(&self, key: String, value: String) {
        let Ok(mut entries) = self.entries.write() else {
            return;
        };

        let now = SystemTime::now();
        if entries.len() >= self.max_entries {
            entries.retain(|_, entry| now < entry.expires_at);
        }
        if entries.len() >= self.max_entries {
            tracing::debug!("Response cache full, dropping new entry");
            return;
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache key for an embedding request
pub fn embedding_cache_key(model: &str, text: &str) -> String {
    format!("embed:{}:{}", model, hash_content(text))
}

/// Cache key for a chat completion request
pub fn chat_cache_key(model: &str, messages_json: &str) -> String {
    format!("chat:{}:{}", model, hash_content(messages_json))
}
