//! HTTP client for OpenAI-compatible LLM services (vLLM, OpenAI, etc.)

use super::cache::{chat_cache_key, embedding_cache_key, ResponseCache};
use crate::config::LLMServiceConfig;
use crate::error::{MetaragError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;

/// Trait for LLM service clients
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate chat completion
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String>;

    /// Generate embeddings for text
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| MetaragError::Llm("No embedding returned".to_string()))
    }

    /// Generate embeddings for multiple texts
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimensions
    fn embedding_dimensions(&self) -> usize;

    /// Get chat model name
    fn model_name(&self) -> &str;

    /// Get embedding model name
    fn embedding_model_name(&self) -> &str;
}

/// Chat message for completion requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
struct ApiMetrics {
    total_requests: AtomicU64,
    total_errors: AtomicU64,
    cache_hits: AtomicU64,
    total_latency_ms: AtomicU64,
}

/// Snapshot of API metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    pub cache_hits: u64,
    pub avg_latency_ms: f64,
}

/// Client for OpenAI-compatible `/v1/chat/completions` and `/v1/embeddings`
pub struct HttpLLMClient {
    http_client: reqwest::Client,
    config: LLMServiceConfig,
    cache: ResponseCache,
    metrics: ApiMetrics,
}

impl HttpLLMClient {
    /// Create new client from configuration
    pub fn new(config: LLMServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            config,
            cache: ResponseCache::new(),
            metrics: ApiMetrics::default(),
        })
    }

    /// Create from `METARAG_*` environment variables
    pub fn from_env() -> Result<Self> {
        let config = LLMServiceConfig::from_env().ok_or_else(|| {
            MetaragError::Config("METARAG_LLM_URL is not set".to_string())
        })?;
        Self::new(config)
    }

    /// Get current API metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        let total = self.metrics.total_requests.load(Ordering::Relaxed);
        MetricsSnapshot {
            total_requests: total,
            total_errors: self.metrics.total_errors.load(Ordering::Relaxed),
            cache_hits: self.metrics.cache_hits.load(Ordering::Relaxed),
            avg_latency_ms: if total > 0 {
                self.metrics.total_latency_ms.load(Ordering::Relaxed) as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    async fn post_json<Req: Serialize + Sync, Resp: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        body: &Req,
        service: &str,
    ) -> Result<Resp> {
        let start = Instant::now();
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        let mut req = self.http_client.post(url).json(body);
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let result = async {
            let response = req.send().await?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(MetaragError::ExternalError(format!(
                    "{} error (HTTP {}): {}",
                    service, status, body
                )));
            }
            Ok(response.json::<Resp>().await?)
        }
        .await;

        if result.is_err() {
            self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
        }
        self.metrics
            .total_latency_ms
            .fetch_add(start.elapsed().as_millis() as u64, Ordering::Relaxed);

        result
    }
}

#[async_trait]
impl LLMClient for HttpLLMClient {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
        #[derive(Serialize)]
        struct ChatRequest {
            model: String,
            messages: Vec<ChatMessage>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatMessage,
        }

        let messages_json = serde_json::to_string(&messages)?;
        let cache_key = chat_cache_key(&self.config.model, &messages_json);
        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!("Cache hit for chat completion");
            self.metrics.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(cached);
        }

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: 0.0,
            max_tokens: 512,
        };
        let url = format!("{}/v1/chat/completions", self.config.url);

        let response: ChatResponse = self.post_json(&url, &request, "LLM service").await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| MetaragError::Llm("No response from LLM".to_string()))?
            .message
            .content;

        self.cache.set(cache_key, content.clone());
        Ok(content)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        #[derive(Serialize)]
        struct EmbedRequest<'a> {
            model: &'a str,
            input: Vec<&'a str>,
        }

        #[derive(Deserialize)]
        struct EmbedResponse {
            data: Vec<EmbedData>,
        }

        #[derive(Deserialize)]
        struct EmbedData {
            index: Option<usize>,
            embedding: Vec<f32>,
        }

        let model = &self.config.embedding_model;
        let mut results: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut missing: Vec<usize> = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            let cached = self
                .cache
                .get(&embedding_cache_key(model, text))
                .and_then(|json| serde_json::from_str::<Vec<f32>>(&json).ok());
            if cached.is_some() {
                self.metrics.cache_hits.fetch_add(1, Ordering::Relaxed);
            } else {
                missing.push(i);
            }
            results.push(cached);
        }

        if !missing.is_empty() {
            tracing::debug!(
                "Embedding batch: {} cached, {} to fetch",
                texts.len() - missing.len(),
                missing.len()
            );

            let request = EmbedRequest {
                model,
                input: missing.iter().map(|&i| texts[i].as_str()).collect(),
            };
            let url = format!("{}/v1/embeddings", self.config.embeddings_url());
            let response: EmbedResponse =
                self.post_json(&url, &request, "Embedding service").await?;

            if response.data.len() != missing.len() {
                return Err(MetaragError::Llm(format!(
                    "Expected {} embeddings, got {}",
                    missing.len(),
                    response.data.len()
                )));
            }

            for (position, data) in response.data.into_iter().enumerate() {
                let slot = data.index.unwrap_or(position);
                let Some(&original) = missing.get(slot) else {
                    return Err(MetaragError::Llm(format!(
                        "Embedding index {} out of range",
                        slot
                    )));
                };
                if let Ok(json) = serde_json::to_string(&data.embedding) {
                    self.cache.set(embedding_cache_key(model, &texts[original]), json);
                }
                results[original] = Some(data.embedding);
            }
        }

        results
            .into_iter()
            .map(|r| r.ok_or_else(|| MetaragError::Llm("Missing embedding in response".to_string())))
            .collect()
    }

    fn embedding_dimensions(&self) -> usize {
        self.config
            .embedding_dimensions
            .unwrap_or(DEFAULT_EMBEDDING_DIMENSIONS)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn embedding_model_name(&self) -> &str {
        &self.config.embedding_model
    }
}

/// Slice out the JSON object in an LLM reply (handles code fences and chatter)
pub fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end > start).then(|| &response[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_object() {
        let reply = "Sure!\n```json\n{\"service\": \"Payment API\"}\n```";
        assert_eq!(
            extract_json_object(reply),
            Some("{\"service\": \"Payment API\"}")
        );
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn test_chat_message_roles() {
        assert_eq!(ChatMessage::system("s").role, "system");
        assert_eq!(ChatMessage::user("u").role, "user");
    }

    #[test]
    fn test_client_defaults() {
        let client = HttpLLMClient::new(LLMServiceConfig::new("http://localhost:8000")).unwrap();
        assert_eq!(client.embedding_dimensions(), 384);
        assert_eq!(client.metrics().total_requests, 0);
        assert_eq!(client.metrics().avg_latency_ms, 0.0);
    }
}
