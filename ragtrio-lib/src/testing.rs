//! Deterministic stand-ins for the hosted services, for unit tests.

use std::sync::Mutex;

use crate::embed::{Embedder, Embedding};
use crate::generate::{GenerationRequest, Generator};
use crate::rerank::{RerankScore, Reranker};
use crate::{Error, Result};

const VOCABULARY: &[&str] = &[
    "drought", "river", "war", "canudos", "cattle", "vaqueiro", "sertão", "rain", "caatinga",
    "conselheiro", "army", "land", "man", "climate", "desert",
];

/// One dimension per vocabulary word, valued by occurrence count.
pub(crate) struct KeywordEmbedder {
    vocabulary: Vec<String>,
    /// Number of `embed_documents` calls, failed ones included
    pub(crate) document_calls: usize,
    /// Make `embed_documents` fail; queries still work
    pub(crate) fail_documents: bool,
}

impl KeywordEmbedder {
    pub(crate) fn embed(&self, text: &str) -> Embedding {
        let text = text.to_lowercase();
        self.vocabulary
            .iter()
            .map(|word| text.matches(word.as_str()).count() as f32)
            .collect()
    }
}

impl Default for KeywordEmbedder {
    fn default() -> Self {
        Self {
            vocabulary: VOCABULARY.iter().map(|w| w.to_string()).collect(),
            document_calls: 0,
            fail_documents: false,
        }
    }
}

impl Embedder for KeywordEmbedder {
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        self.document_calls += 1;
        if self.fail_documents {
            return Err(Error::Embedding("service unavailable".to_string()));
        }
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        Ok(self.embed(text))
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.vocabulary.len())
    }

    fn model_name(&self) -> &str {
        "keyword"
    }
}

/// Every call fails like an unreachable service.
pub(crate) struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed_documents(&mut self, _texts: &[&str]) -> Result<Vec<Embedding>> {
        Err(Error::Embedding("service unavailable".to_string()))
    }

    fn embed_query(&mut self, _text: &str) -> Result<Embedding> {
        Err(Error::Embedding("service unavailable".to_string()))
    }

    fn dimension(&self) -> Option<usize> {
        None
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

/// Scores a document by how many query words it contains.
#[derive(Default)]
pub(crate) struct OverlapReranker {
    pub(crate) fail: bool,
}

impl Reranker for OverlapReranker {
    fn score(&mut self, query: &str, documents: &[&str], _top_n: usize) -> Result<Vec<RerankScore>> {
        if self.fail {
            return Err(Error::Reranking("rerank service unavailable".to_string()));
        }
        let words: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        Ok(documents
            .iter()
            .enumerate()
            .map(|(index, doc)| {
                let doc = doc.to_lowercase();
                let hits = words.iter().filter(|w| doc.contains(w.as_str())).count();
                RerankScore {
                    index,
                    score: hits as f32 / words.len().max(1) as f32,
                }
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "overlap"
    }
}

/// Records every request and answers with a fixed text.
pub(crate) struct RecordingGenerator {
    pub(crate) reply: String,
    pub(crate) requests: Mutex<Vec<(String, usize)>>,
    pub(crate) fail: bool,
}

impl RecordingGenerator {
    pub(crate) fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
            fail: false,
        }
    }
}

impl Generator for RecordingGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.requests
            .lock()
            .unwrap()
            .push((request.prompt.to_string(), request.max_tokens));
        if self.fail {
            return Err(Error::Generation("chat service unavailable".to_string()));
        }
        Ok(self.reply.clone())
    }

    fn model_name(&self) -> &str {
        "recording"
    }
}
