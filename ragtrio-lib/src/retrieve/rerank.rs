use std::path::{Path, PathBuf};

use crate::chunk::{Chunk, Chunker, FixedSizeChunker};
use crate::embed::Embedder;
use crate::load::Page;
use crate::rerank::Reranker;
use crate::retrieve::{snapshot_path, IndexStats, Retriever, SplitConfig};
use crate::search::SearchEngine;
use crate::store::{MemoryStore, SearchResult};
use crate::Result;

/// Settings for [`RerankRetriever`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RerankConfig {
    pub split: SplitConfig,
    /// Candidates fetched by embedding similarity
    pub candidates: usize,
    /// Results kept after reranking
    pub top_n: usize,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            split: SplitConfig::new(4000, 20),
            candidates: 10,
            top_n: 3,
        }
    }
}

/// Two-stage retrieval: wide similarity search, then a reranker picks the best few.
///
/// Scores in the output are rerank scores, not cosine similarities. A
/// reranker failure fails the query; there is no fallback to the
/// similarity order.
pub struct RerankRetriever<E: Embedder, R: Reranker> {
    engine: SearchEngine<E, MemoryStore>,
    reranker: R,
    chunker: FixedSizeChunker,
    config: RerankConfig,
}

impl<E: Embedder, R: Reranker> RerankRetriever<E, R> {
    pub fn new(embedder: E, reranker: R, config: RerankConfig) -> Result<Self> {
        Ok(Self {
            engine: SearchEngine::new(embedder, MemoryStore::new()),
            reranker,
            chunker: config.split.chunker()?,
            config,
        })
    }

    fn snapshot(&self, dir: &Path, document: &str) -> PathBuf {
        let split = format!("{}x{}", self.config.split.chunk_size, self.config.split.overlap);
        snapshot_path(
            dir,
            document,
            &[self.name(), split.as_str(), self.engine.embedder().model_name()],
            "vectors",
        )
    }
}

impl<E: Embedder, R: Reranker> Retriever for RerankRetriever<E, R> {
    fn name(&self) -> &str {
        "rerank"
    }

    fn index(&mut self, pages: &[Page]) -> Result<IndexStats> {
        let chunks = self.chunker.chunk_pages(pages);
        let embedded = self.engine.reindex(&chunks)?;

        Ok(IndexStats {
            embedded,
            stored: 0,
        })
    }

    fn retrieve(&mut self, query: &str) -> Result<Vec<SearchResult>> {
        let candidates = self.engine.search(query, self.config.candidates)?;
        let chunks: Vec<Chunk> = candidates.into_iter().map(|r| r.chunk).collect();
        let considered = chunks.len();

        let ranked = self.reranker.rerank(query, chunks, self.config.top_n)?;
        tracing::debug!(
            candidates = considered,
            kept = ranked.len(),
            model = self.reranker.model_name(),
            "reranked candidates"
        );

        Ok(ranked
            .into_iter()
            .map(|(chunk, score)| SearchResult { chunk, score })
            .collect())
    }

    fn len(&self) -> usize {
        self.engine.len()
    }

    fn save(&self, dir: &Path, document: &str) -> Result<()> {
        self.engine.store().save(&self.snapshot(dir, document))
    }

    fn restore(&mut self, dir: &Path, document: &str) -> Result<Option<IndexStats>> {
        let path = self.snapshot(dir, document);
        if !path.is_file() {
            return Ok(None);
        }
        *self.engine.store_mut() = MemoryStore::load(&path)?;
        tracing::info!(path = %path.display(), chunks = self.len(), "restored rerank index");
        Ok(Some(IndexStats {
            embedded: self.len(),
            stored: 0,
        }))
    }
}
