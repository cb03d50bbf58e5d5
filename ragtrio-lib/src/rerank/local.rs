use fastembed::{RerankInitOptions, RerankerModel, TextRerank};

use crate::rerank::{RerankScore, Reranker};
use crate::{Error, Result};

/// Local cross-encoder reranker using BAAI/bge-reranker-v2-m3.
///
/// Multilingual, so it can score the Portuguese text directly against
/// English questions.
pub struct LocalReranker {
    model: TextRerank,
}

impl LocalReranker {
    /// Create a new local reranker.
    ///
    /// Downloads the model on first use (~2.2GB).
    pub fn new() -> Result<Self> {
        let opts = RerankInitOptions::new(RerankerModel::BGERerankerV2M3)
            .with_show_download_progress(true);

        TextRerank::try_new(opts)
            .map(|model| Self { model })
            .map_err(|e| Error::Reranking(e.to_string()))
    }
}

impl Reranker for LocalReranker {
    fn model_name(&self) -> &str {
        "BAAI/bge-reranker-v2-m3"
    }

    fn score(&mut self, query: &str, documents: &[&str], _top_n: usize) -> Result<Vec<RerankScore>> {
        let results = self
            .model
            .rerank(query, documents, false, None)
            .map_err(|e| Error::Reranking(e.to_string()))?;

        Ok(results
            .into_iter()
            .map(|rr| RerankScore {
                index: rr.index,
                score: rr.score,
            })
            .collect())
    }
}
