use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::http;
use crate::rerank::{RerankScore, Reranker};
use crate::{Error, Result};

/// Settings for [`CohereReranker`].
#[derive(Debug, Clone)]
pub struct CohereRerankerConfig {
    pub api_key: String,
    /// Base URL of a Cohere-compatible API, e.g. `https://api.cohere.com/v1`
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl CohereRerankerConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.cohere.com/v1".to_string(),
            model: "rerank-multilingual-v3.0".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Blocking client for the Cohere `/rerank` endpoint.
pub struct CohereReranker {
    client: Client,
    endpoint: String,
    model: String,
}

impl CohereReranker {
    pub fn new(config: CohereRerankerConfig) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(Error::Config("missing rerank model name".to_string()));
        }
        let client = http::bearer_client("Cohere", &config.api_key, config.timeout)?;

        Ok(Self {
            client,
            endpoint: http::endpoint(&config.base_url, "rerank"),
            model: config.model,
        })
    }
}

impl Reranker for CohereReranker {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn score(&mut self, query: &str, documents: &[&str], top_n: usize) -> Result<Vec<RerankScore>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let request = RerankRequest {
            model: &self.model,
            query,
            documents,
            top_n: top_n.min(documents.len()),
        };
        tracing::debug!(candidates = documents.len(), top_n = request.top_n, "calling rerank");

        let response: RerankResponse =
            http::post_json(&self.client, &self.endpoint, &request).map_err(Error::Reranking)?;
        Ok(response.into_scores())
    }
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [&'a str],
    top_n: usize,
}

#[derive(Debug, Deserialize)]
struct RerankResponse {
    results: Vec<RerankResult>,
}

#[derive(Debug, Deserialize)]
struct RerankResult {
    index: usize,
    relevance_score: f32,
}

impl RerankResponse {
    fn into_scores(self) -> Vec<RerankScore> {
        self.results
            .into_iter()
            .map(|r| RerankScore {
                index: r.index,
                score: r.relevance_score,
            })
            .collect()
    }
}
