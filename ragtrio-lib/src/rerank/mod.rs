//! Second-stage reranking
//!
//! A reranker scores (query, document) pairs together, which ranks better
//! than comparing independently computed embeddings. The service only ever
//! sees candidate texts and answers with (index, score) pairs; mapping those
//! back to chunks happens here, so chunk content can never be altered by the
//! rerank step.

use std::collections::HashSet;

use crate::chunk::Chunk;
use crate::{Error, Result};

/// Relevance score for one candidate, by position in the submitted list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RerankScore {
    pub index: usize,
    pub score: f32,
}

pub trait Reranker: Send + Sync {
    /// Score candidate documents against a query.
    ///
    /// `top_n` is a hint; implementations may return scores for every
    /// document. Indices refer to positions in `documents`.
    fn score(&mut self, query: &str, documents: &[&str], top_n: usize) -> Result<Vec<RerankScore>>;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;

    /// Reorder `chunks` by relevance to `query` and keep the best `top_n`.
    ///
    /// Output is sorted by rerank score, highest first, and is a subset of
    /// the input. Indices that are out of range or repeated are an error.
    fn rerank(&mut self, query: &str, chunks: Vec<Chunk>, top_n: usize) -> Result<Vec<(Chunk, f32)>> {
        if chunks.is_empty() || top_n == 0 {
            return Ok(Vec::new());
        }

        let docs: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let mut scores = self.score(query, &docs, top_n)?;

        let mut seen = HashSet::with_capacity(scores.len());
        for s in &scores {
            if s.index >= chunks.len() {
                return Err(Error::Reranking(format!(
                    "index {} out of range for {} candidates",
                    s.index,
                    chunks.len()
                )));
            }
            if !seen.insert(s.index) {
                return Err(Error::Reranking(format!("index {} scored twice", s.index)));
            }
        }

        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        scores.truncate(top_n);

        // Wrap chunks in Option so each can be moved out once by index
        let mut chunks: Vec<Option<Chunk>> = chunks.into_iter().map(Some).collect();
        Ok(scores
            .into_iter()
            .filter_map(|s| chunks[s.index].take().map(|chunk| (chunk, s.score)))
            .collect())
    }
}

impl<T: Reranker + ?Sized> Reranker for Box<T> {
    fn score(&mut self, query: &str, documents: &[&str], top_n: usize) -> Result<Vec<RerankScore>> {
        (**self).score(query, documents, top_n)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

mod cohere;
pub use cohere::*;

#[cfg(feature = "local")]
mod local;
#[cfg(feature = "local")]
pub use local::*;
