use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::embed::{Embedder, Embedding};
use crate::http;
use crate::{Error, Result};

/// Settings for [`OpenAiEmbedder`].
#[derive(Debug, Clone)]
pub struct OpenAiEmbedderConfig {
    pub api_key: String,
    /// Base URL of an OpenAI-compatible API, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    pub model: String,
    /// Optional dimension override for models that support it
    pub dimensions: Option<usize>,
    pub timeout: Duration,
    /// Maximum number of texts per request
    pub batch_size: usize,
}

impl OpenAiEmbedderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: None,
            timeout: Duration::from_secs(60),
            batch_size: 64,
        }
    }
}

/// Blocking embeddings client for OpenAI-compatible endpoints.
///
/// Documents are sent in batches of at most `batch_size`. A failed request
/// fails the whole call; nothing is retried.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimensions: Option<usize>,
    batch_size: usize,
}

impl OpenAiEmbedder {
    pub fn new(config: OpenAiEmbedderConfig) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(Error::Config("missing embedding model name".to_string()));
        }
        let client = http::bearer_client("OpenAI", &config.api_key, config.timeout)?;

        Ok(Self {
            client,
            endpoint: http::endpoint(&config.base_url, "embeddings"),
            model: config.model,
            dimensions: config.dimensions,
            batch_size: config.batch_size.max(1),
        })
    }

    /// Maximum batch size configured for this client.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn embed_batch(&self, inputs: &[&str]) -> Result<Vec<Embedding>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs,
            dimensions: self.dimensions,
        };
        let response: EmbeddingResponse =
            http::post_json(&self.client, &self.endpoint, &request).map_err(Error::Embedding)?;

        response.into_embeddings(inputs.len())
    }
}

impl Embedder for OpenAiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> Option<usize> {
        self.dimensions
    }

    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        embed_in_batches(texts, self.batch_size, |i, batch| {
            tracing::debug!(batch = i, size = batch.len(), model = %self.model, "embedding batch");
            self.embed_batch(batch)
        })
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("service returned no embeddings".to_string()))
    }
}

/// Call `embed` once per batch of at most `batch_size` texts, in order, and
/// concatenate the results. The first failing batch aborts the rest.
fn embed_in_batches<F>(texts: &[&str], batch_size: usize, mut embed: F) -> Result<Vec<Embedding>>
where
    F: FnMut(usize, &[&str]) -> Result<Vec<Embedding>>,
{
    let mut embeddings = Vec::with_capacity(texts.len());
    for (i, batch) in texts.chunks(batch_size.max(1)).enumerate() {
        embeddings.extend(embed(i, batch)?);
    }
    Ok(embeddings)
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

impl EmbeddingResponse {
    /// Order by `index` and check there is exactly one vector per input.
    fn into_embeddings(mut self, expected: usize) -> Result<Vec<Embedding>> {
        if self.data.len() != expected {
            return Err(Error::Embedding(format!(
                "service returned {} embeddings for {} inputs",
                self.data.len(),
                expected
            )));
        }
        self.data.sort_by_key(|entry| entry.index);
        if self.data.iter().enumerate().any(|(i, entry)| entry.index != i) {
            return Err(Error::Embedding("embedding indices are not 0..n".to_string()));
        }

        Ok(self.data.into_iter().map(|entry| entry.embedding).collect())
    }
}
