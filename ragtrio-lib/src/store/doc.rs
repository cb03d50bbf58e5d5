use std::collections::HashMap;
use std::path::Path;

use crate::chunk::Chunk;
use crate::store::{read_json, write_json, DocStore};
use crate::Result;

/// In-memory id -> chunk table used for parent documents.
#[derive(Debug, Default, Clone)]
pub struct MemoryDocStore {
    docs: HashMap<String, Chunk>,
}

impl MemoryDocStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write all entries to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut docs: Vec<&Chunk> = self.docs.values().collect();
        docs.sort_by(|a, b| a.id.cmp(&b.id));
        write_json(path, &docs)
    }

    /// Read a store previously written with [`save`](Self::save).
    pub fn load(path: &Path) -> Result<Self> {
        let docs: Vec<Chunk> = read_json(path)?;
        let mut store = Self::new();
        store.put(&docs);
        Ok(store)
    }
}

impl DocStore for MemoryDocStore {
    fn put(&mut self, chunks: &[Chunk]) {
        for chunk in chunks {
            self.docs.insert(chunk.id.clone(), chunk.clone());
        }
    }

    fn get(&self, id: &str) -> Option<&Chunk> {
        self.docs.get(id)
    }

    fn len(&self) -> usize {
        self.docs.len()
    }

    fn clear(&mut self) {
        self.docs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkMetadata;

    fn make_chunk(id: &str, content: &str) -> Chunk {
        Chunk {
            id: id.to_string(),
            content: content.to_string(),
            metadata: ChunkMetadata::default(),
        }
    }

    #[test]
    fn test_put_and_get() {
        let mut store = MemoryDocStore::new();
        store.put(&[make_chunk("p1", "parent one"), make_chunk("p2", "parent two")]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("p2").unwrap().content, "parent two");
        assert!(store.get("p3").is_none());
    }

    #[test]
    fn test_mget_keeps_order_and_gaps() {
        let mut store = MemoryDocStore::new();
        store.put(&[make_chunk("a", "A"), make_chunk("b", "B")]);

        let got = store.mget(&["b", "missing", "a"]);
        assert_eq!(got.len(), 3);
        assert_eq!(got[0].unwrap().content, "B");
        assert!(got[1].is_none());
        assert_eq!(got[2].unwrap().content, "A");
    }

    #[test]
    fn test_put_replaces_existing() {
        let mut store = MemoryDocStore::new();
        store.put(&[make_chunk("a", "old")]);
        store.put(&[make_chunk("a", "new")]);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().content, "new");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parents.json");

        let mut store = MemoryDocStore::new();
        store.put(&[make_chunk("a", "A"), make_chunk("b", "B")]);
        store.save(&path).unwrap();

        let loaded = MemoryDocStore::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("a"), store.get("a"));
    }
}
