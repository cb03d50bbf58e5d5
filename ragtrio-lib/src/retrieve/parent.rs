use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::chunk::{Chunk, Chunker, FixedSizeChunker};
use crate::embed::Embedder;
use crate::load::Page;
use crate::retrieve::{snapshot_path, IndexStats, Retriever, SplitConfig};
use crate::search::SearchEngine;
use crate::store::{DocStore, MemoryDocStore, MemoryStore, SearchResult};
use crate::Result;

/// Settings for [`ParentDocumentRetriever`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentConfig {
    pub parent_split: SplitConfig,
    pub child_split: SplitConfig,
    /// Child matches fetched per query, before mapping to parents
    pub child_k: usize,
}

impl Default for ParentConfig {
    fn default() -> Self {
        Self {
            parent_split: SplitConfig::new(4000, 200),
            child_split: SplitConfig::new(200, 0),
            child_k: 4,
        }
    }
}

/// Searches small child chunks, answers with the parent chunks they came from.
///
/// Only children are embedded. Parents live in a [`MemoryDocStore`] keyed by
/// id, and each child names its parent in `metadata.parent_id`, so mapping a
/// hit back to its parent is two table lookups.
pub struct ParentDocumentRetriever<E: Embedder> {
    engine: SearchEngine<E, MemoryStore>,
    parents: MemoryDocStore,
    parent_chunker: FixedSizeChunker,
    child_chunker: FixedSizeChunker,
    config: ParentConfig,
}

impl<E: Embedder> ParentDocumentRetriever<E> {
    pub fn new(embedder: E, config: ParentConfig) -> Result<Self> {
        Ok(Self {
            engine: SearchEngine::new(embedder, MemoryStore::new()),
            parents: MemoryDocStore::new(),
            parent_chunker: config.parent_split.chunker()?,
            child_chunker: config.child_split.chunker()?,
            config,
        })
    }

    /// The parent document store.
    pub fn parents(&self) -> &MemoryDocStore {
        &self.parents
    }

    fn snapshot(&self, dir: &Path, document: &str, kind: &str) -> PathBuf {
        let parent = format!(
            "{}x{}",
            self.config.parent_split.chunk_size, self.config.parent_split.overlap
        );
        let child = format!(
            "{}x{}",
            self.config.child_split.chunk_size, self.config.child_split.overlap
        );
        snapshot_path(
            dir,
            document,
            &[
                self.name(),
                parent.as_str(),
                child.as_str(),
                self.engine.embedder().model_name(),
            ],
            kind,
        )
    }

    /// Map child hits to distinct parents, in order of first appearance.
    ///
    /// A parent's score is that of its best-ranked child. Children whose
    /// parent cannot be found are dropped.
    fn resolve_parents(&self, hits: Vec<SearchResult>) -> Vec<SearchResult> {
        let mut seen = HashSet::new();
        let mut results = Vec::new();

        for hit in hits {
            let Some(parent_id) = hit.chunk.metadata.parent_id.as_deref() else {
                tracing::debug!(child = %hit.chunk.id, "child has no parent reference, dropping");
                continue;
            };
            if seen.contains(parent_id) {
                continue;
            }
            let Some(parent) = self.parents.get(parent_id) else {
                tracing::debug!(child = %hit.chunk.id, parent = parent_id, "parent missing from store, dropping");
                continue;
            };

            seen.insert(parent_id.to_string());
            results.push(SearchResult {
                chunk: parent.clone(),
                score: hit.score,
            });
        }
        results
    }
}

impl<E: Embedder> Retriever for ParentDocumentRetriever<E> {
    fn name(&self) -> &str {
        "parent"
    }

    fn index(&mut self, pages: &[Page]) -> Result<IndexStats> {
        let parents = self.parent_chunker.chunk_pages(pages);
        let children: Vec<Chunk> = parents
            .iter()
            .flat_map(|parent| self.child_chunker.split_chunk(parent))
            .collect();
        tracing::info!(parents = parents.len(), children = children.len(), "split parent documents");

        // embed first; a failure leaves the previous index intact
        let embedded = self.engine.reindex(&children)?;
        let mut store = MemoryDocStore::new();
        store.put(&parents);
        self.parents = store;

        Ok(IndexStats {
            embedded,
            stored: self.parents.len(),
        })
    }

    fn retrieve(&mut self, query: &str) -> Result<Vec<SearchResult>> {
        let hits = self.engine.search(query, self.config.child_k)?;
        Ok(self.resolve_parents(hits))
    }

    fn len(&self) -> usize {
        self.engine.len()
    }

    fn save(&self, dir: &Path, document: &str) -> Result<()> {
        self.engine.store().save(&self.snapshot(dir, document, "vectors"))?;
        self.parents.save(&self.snapshot(dir, document, "parents"))
    }

    fn restore(&mut self, dir: &Path, document: &str) -> Result<Option<IndexStats>> {
        let vectors = self.snapshot(dir, document, "vectors");
        let parents = self.snapshot(dir, document, "parents");
        if !vectors.is_file() || !parents.is_file() {
            return Ok(None);
        }

        *self.engine.store_mut() = MemoryStore::load(&vectors)?;
        self.parents = MemoryDocStore::load(&parents)?;
        tracing::info!(
            children = self.len(),
            parents = self.parents.len(),
            "restored parent document index"
        );
        Ok(Some(IndexStats {
            embedded: self.len(),
            stored: self.parents.len(),
        }))
    }
}
