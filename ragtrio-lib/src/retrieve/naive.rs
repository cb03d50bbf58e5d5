use std::path::Path;

use crate::chunk::{Chunker, FixedSizeChunker};
use crate::embed::Embedder;
use crate::load::Page;
use crate::retrieve::{snapshot_path, IndexStats, Retriever, SplitConfig};
use crate::search::SearchEngine;
use crate::store::{MemoryStore, SearchResult};
use crate::Result;

/// Settings for [`NaiveRetriever`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NaiveConfig {
    pub split: SplitConfig,
    pub top_k: usize,
}

impl Default for NaiveConfig {
    fn default() -> Self {
        Self {
            split: SplitConfig::new(4000, 20),
            top_k: 3,
        }
    }
}

/// Plain top-k similarity retrieval over fixed-size chunks.
pub struct NaiveRetriever<E: Embedder> {
    engine: SearchEngine<E, MemoryStore>,
    chunker: FixedSizeChunker,
    config: NaiveConfig,
}

impl<E: Embedder> NaiveRetriever<E> {
    pub fn new(embedder: E, config: NaiveConfig) -> Result<Self> {
        Ok(Self {
            engine: SearchEngine::new(embedder, MemoryStore::new()),
            chunker: config.split.chunker()?,
            config,
        })
    }

    fn snapshot(&self, dir: &Path, document: &str) -> std::path::PathBuf {
        let split = format!("{}x{}", self.config.split.chunk_size, self.config.split.overlap);
        snapshot_path(
            dir,
            document,
            &[self.name(), split.as_str(), self.engine.embedder().model_name()],
            "vectors",
        )
    }
}

impl<E: Embedder> Retriever for NaiveRetriever<E> {
    fn name(&self) -> &str {
        "naive"
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
        self.engine.search(query, self.config.top_k)
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
        tracing::info!(path = %path.display(), chunks = self.len(), "restored naive index");
        Ok(Some(IndexStats {
            embedded: self.len(),
            stored: 0,
        }))
    }
}
