//! Retrieval strategies
//!
//! Each retriever owns its chunkers, its embedding index and whatever extra
//! state the strategy needs:
//!
//! ```text
//! naive:   pages -> 4000/20 chunks -> index            query -> top 3
//! parent:  pages -> 4000/200 parents -> 200/0 children query -> top 4 children
//!                      |                    |                -> distinct parents
//!                  doc store            index
//! rerank:  pages -> 4000/20 chunks -> index            query -> top 10 -> rerank -> top 3
//! ```
//!
//! Indexing happens once; afterwards the stores are only read.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::{Path, PathBuf};

use crate::chunk::FixedSizeChunker;
use crate::load::Page;
use crate::store::SearchResult;
use crate::Result;

/// Chunk window parameters, in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl SplitConfig {
    pub const fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }

    pub fn chunker(&self) -> Result<FixedSizeChunker> {
        FixedSizeChunker::new(self.chunk_size, self.overlap)
    }
}

/// Counts reported after indexing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Chunks embedded into the vector index
    pub embedded: usize,
    /// Chunks kept in a side document store (parent chunks)
    pub stored: usize,
}

/// A retrieval strategy over one indexed document.
pub trait Retriever: Send {
    /// Returns the name of this strategy
    fn name(&self) -> &str;

    /// Chunk and embed the pages, replacing any previous index.
    fn index(&mut self, pages: &[Page]) -> Result<IndexStats>;

    /// Context for a query, best first.
    fn retrieve(&mut self, query: &str) -> Result<Vec<SearchResult>>;

    /// Number of embedded chunks
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the index under `dir`, tagged with the indexed document's
    /// [`document_key`].
    fn save(&self, dir: &Path, document: &str) -> Result<()>;

    /// Load an index written by [`save`](Self::save) for the same document,
    /// parameters and embedding model. Returns `None` if there is none.
    fn restore(&mut self, dir: &Path, document: &str) -> Result<Option<IndexStats>>;
}

/// Identity of a page set: a hash of every page's source, index and text.
///
/// Snapshots are filed under this key, so a directory shared by several
/// documents never hands one document's index to another.
pub fn document_key(pages: &[Page]) -> String {
    let mut hasher = DefaultHasher::new();
    pages.len().hash(&mut hasher);
    for page in pages {
        page.source.hash(&mut hasher);
        page.index.hash(&mut hasher);
        page.content.hash(&mut hasher);
    }
    format!("{:016x}", hasher.finish())
}

/// Snapshot file path, keyed by everything that changes the index contents.
pub(crate) fn snapshot_path(dir: &Path, document: &str, parts: &[&str], kind: &str) -> PathBuf {
    let stem: String = parts
        .iter()
        .copied()
        .chain([document])
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' { ch } else { '_' })
        .collect();
    dir.join(format!("{stem}.{kind}.json"))
}

mod naive;
mod parent;
mod rerank;

pub use naive::*;
pub use parent::*;
pub use rerank::*;

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::load::Page;

    /// Three pages about different topics, long enough to need several chunks.
    pub(crate) fn pages() -> Vec<Page> {
        let texts = [
            "The caatinga withers under drought. The river disappears and the land \
             becomes a desert of stones. The climate is cruel; when rain comes the \
             caatinga blooms again overnight.",
            "The vaqueiro rides through thorns after the cattle. Drought kills the \
             cattle and the vaqueiro walks south with his family.",
            "Canudos grew around Antonio Conselheiro. The army marched four times \
             against Canudos before the war ended in fire.",
        ];
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| Page {
                index,
                source: "os_sertoes.pdf".to_string(),
                content: text.to_string(),
            })
            .collect()
    }
}
