use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;
use crate::embed::Embedding;
use crate::store::{read_json, write_json, SearchResult, VectorStore};
use crate::{Error, Result};

/// In-memory vector store.
///
/// Uses brute-force cosine similarity search over an insertion-ordered
/// arena, which is plenty for a single book. Ids map to arena slots so
/// re-inserting an id overwrites in place.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Vec<StoredEntry>,
    slots: HashMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    chunk: Chunk,
    embedding: Embedding,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimension of the stored vectors, if any are stored.
    pub fn dimension(&self) -> Option<usize> {
        self.entries.first().map(|entry| entry.embedding.len())
    }

    /// Write all chunks and embeddings to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, &self.entries)
    }

    /// Read a store previously written with [`save`](Self::save).
    pub fn load(path: &Path) -> Result<Self> {
        let entries: Vec<StoredEntry> = read_json(path)?;
        let mut store = Self::new();
        for entry in entries {
            store.check_dimension(&entry.embedding)?;
            store.upsert(entry);
        }
        Ok(store)
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<()> {
        match self.dimension() {
            Some(dim) if dim != embedding.len() => Err(Error::Store(format!(
                "embedding has dimension {}, store holds dimension {dim}",
                embedding.len()
            ))),
            _ => Ok(()),
        }
    }

    fn upsert(&mut self, entry: StoredEntry) {
        match self.slots.get(&entry.chunk.id) {
            Some(&slot) => self.entries[slot] = entry,
            None => {
                self.slots.insert(entry.chunk.id.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }
}

impl VectorStore for MemoryStore {
    fn insert(&mut self, chunks: &[Chunk], embeddings: &[Embedding]) -> Result<()> {
        if chunks.len() != embeddings.len() {
            return Err(Error::Store(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            self.check_dimension(embedding)?;
            self.upsert(StoredEntry {
                chunk: chunk.clone(),
                embedding: embedding.clone(),
            });
        }
        Ok(())
    }

    fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SearchResult>> {
        self.check_dimension(query)?;

        let mut results: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query, &entry.embedding),
            })
            .collect();

        // stable, so ties stay in insertion order
        results.sort_by(|a, b| b.cmp(a));
        results.truncate(k);
        Ok(results)
    }

    fn get(&self, id: &str) -> Option<&Chunk> {
        self.slots.get(id).map(|&slot| &self.entries[slot].chunk)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.slots.clear();
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 means identical direction.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
