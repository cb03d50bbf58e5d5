//! Vector and document storage
//!
//! The vector store keeps each chunk next to its embedding, keyed by chunk
//! id. The document store is a plain id -> chunk table. The parent/child
//! pipeline keeps its parent chunks there and only indexes children in the
//! vector store.
//!
//! Both stores are written once while indexing and only read afterwards.
//! They can be snapshotted to JSON so a later run can skip re-embedding.
//!
//! # Usage
//!
//! ```ignore
//! use ragtrio_lib::store::{VectorStore, MemoryStore};
//!
//! let mut store = MemoryStore::new();
//!
//! store.insert(&chunks, &embeddings)?;
//! let results = store.search(&query_embedding, 3)?;
//! ```

use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;
use crate::embed::Embedding;
use crate::{Error, Result};

/// A retrieved chunk and how well it matched.
///
/// Ordering and equality look at `score` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: Chunk,
    /// Cosine similarity in [-1, 1], or a reranker's relevance score
    pub score: f32,
}

impl PartialOrd for SearchResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchResult {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.total_cmp(&other.score)
    }
}

impl PartialEq for SearchResult {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchResult {}

/// Similarity index over embedded chunks
pub trait VectorStore: Send + Sync {
    /// Store `chunks[i]` with `embeddings[i]`. The slices must be the same
    /// length. An id that is already stored is replaced.
    fn insert(&mut self, chunks: &[Chunk], embeddings: &[Embedding]) -> Result<()>;

    /// The `k` chunks closest to `query`, best first. Equal scores keep
    /// insertion order.
    fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SearchResult>>;

    fn get(&self, id: &str) -> Option<&Chunk>;

    /// Number of stored chunks
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);
}

/// Trait for key-value chunk storage
pub trait DocStore: Send + Sync {
    /// Store chunks under their ids, replacing existing entries
    fn put(&mut self, chunks: &[Chunk]);

    /// Fetch a chunk by id
    fn get(&self, id: &str) -> Option<&Chunk>;

    /// Fetch several chunks, `None` where an id is unknown
    fn mget(&self, ids: &[&str]) -> Vec<Option<&Chunk>> {
        ids.iter().map(|id| self.get(id)).collect()
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| Error::Store(format!("failed to create {}: {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)
        .map_err(|e| Error::Store(format!("failed to write {}: {e}", path.display())))?;
    writer
        .flush()
        .map_err(|e| Error::Store(format!("failed to flush {}: {e}", path.display())))
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)
        .map_err(|e| Error::Store(format!("failed to open {}: {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| Error::Store(format!("failed to read {}: {e}", path.display())))
}

mod doc;
mod memory;

pub use doc::*;
pub use memory::*;
