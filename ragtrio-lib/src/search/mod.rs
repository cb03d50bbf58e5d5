//! High-level search interface
//!
//! Combines embedder and store into the similarity search every retriever
//! starts from.
//!
//! # Usage
//!
//! ```ignore
//! use ragtrio_lib::search::SearchEngine;
//!
//! let mut engine = SearchEngine::new(embedder, store);
//! engine.index(&chunks)?;
//! let results = engine.search("How is the caatinga described?", 3)?;
//! ```

use crate::chunk::Chunk;
use crate::embed::{Embedder, Embedding};
use crate::store::{SearchResult, VectorStore};
use crate::{Error, Result};

/// Search engine combining an embedder and a vector store.
pub struct SearchEngine<E: Embedder, S: VectorStore> {
    embedder: E,
    store: S,
}

impl<E: Embedder, S: VectorStore> SearchEngine<E, S> {
    /// Create a new search engine.
    #[must_use]
    pub fn new(embedder: E, store: S) -> Self {
        Self { embedder, store }
    }

    /// Index chunks by computing embeddings and storing them.
    ///
    /// Returns the number of chunks embedded.
    pub fn index(&mut self, chunks: &[Chunk]) -> Result<usize> {
        let embeddings = self.embed_chunks(chunks)?;
        self.store.insert(chunks, &embeddings)?;
        self.log_indexed(chunks.len());
        Ok(chunks.len())
    }

    /// Replace the whole index with `chunks`.
    ///
    /// Embedding happens before the store is touched, so on failure the
    /// previous index is still in place.
    pub fn reindex(&mut self, chunks: &[Chunk]) -> Result<usize>
    where
        S: Default,
    {
        let embeddings = self.embed_chunks(chunks)?;
        let mut store = S::default();
        store.insert(chunks, &embeddings)?;
        self.store = store;
        self.log_indexed(chunks.len());
        Ok(chunks.len())
    }

    fn embed_chunks(&mut self, chunks: &[Chunk]) -> Result<Vec<Embedding>> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embedder.embed_documents(&texts)?;
        if embeddings.len() != chunks.len() {
            return Err(Error::Embedding(format!(
                "{} returned {} embeddings for {} chunks",
                self.embedder.model_name(),
                embeddings.len(),
                chunks.len()
            )));
        }
        Ok(embeddings)
    }

    fn log_indexed(&self, chunks: usize) {
        if chunks > 0 {
            tracing::info!(chunks, model = self.embedder.model_name(), "indexed chunks");
        }
    }

    /// Search for chunks similar to the query using embedding similarity.
    ///
    /// Results are sorted by score, highest first, and there are at most `k`.
    pub fn search(&mut self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedder.embed_query(query)?;
        let results = self.store.search(&query_embedding, k)?;
        tracing::debug!(k, hits = results.len(), "similarity search");
        Ok(results)
    }

    /// Returns the number of indexed chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if no chunks are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns a reference to the embedder.
    #[must_use]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn embedder_mut(&mut self) -> &mut E {
        &mut self.embedder
    }

    /// Returns a reference to the store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a mutable reference to the store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
