//! Splitting page text into chunks
//!
//! All three pipelines cut page text into fixed-size overlapping character
//! windows. The parent/child pipeline runs a second, finer chunker over each
//! parent chunk; the children keep the parent's id in their metadata.
//!
//! ```ignore
//! use ragtrio_lib::chunk::{Chunker, FixedSizeChunker};
//!
//! let parents = FixedSizeChunker::new(4000, 200)?.chunk_pages(&pages);
//! let children = FixedSizeChunker::new(200, 0)?.split_chunk(&parents[0]);
//! assert_eq!(children[0].metadata.parent_id.as_deref(), Some(parents[0].id.as_str()));
//! ```

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::load::Page;

/// A window of document text
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Chunk {
    /// Derived from source, position and content, so stable across runs
    pub id: String,
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// Where a chunk came from
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct ChunkMetadata {
    /// Source document path
    pub source_id: Option<String>,
    /// Page index within the source document
    pub page: Option<usize>,
    /// Character offset within the text that was split (page or parent chunk)
    pub position: usize,
    /// Total number of chunks cut from the same text
    pub total_chunks: Option<usize>,
    /// Id of the parent chunk this chunk was cut from
    pub parent_id: Option<String>,
    /// Free-form tags, flattened into the serialized chunk
    #[serde(flatten)]
    pub extra: HashMap<String, String>,
}

pub trait Chunker: Send + Sync {
    /// Split `content` in order. Every chunk starts from a copy of
    /// `metadata` with its own `position` and `total_chunks` filled in.
    fn chunk(&self, content: &str, metadata: ChunkMetadata) -> Vec<Chunk>;

    fn name(&self) -> &str;

    /// Chunk every page in order, tagging chunks with source and page.
    ///
    /// Pages with no visible text are skipped.
    fn chunk_pages(&self, pages: &[Page]) -> Vec<Chunk> {
        pages
            .iter()
            .filter(|page| !page.content.trim().is_empty())
            .flat_map(|page| {
                let metadata = ChunkMetadata {
                    source_id: Some(page.source.clone()),
                    page: Some(page.index),
                    ..ChunkMetadata::default()
                };
                self.chunk(&page.content, metadata)
            })
            .collect()
    }

    /// Re-split a chunk into children that point back at it.
    fn split_chunk(&self, parent: &Chunk) -> Vec<Chunk> {
        let metadata = ChunkMetadata {
            parent_id: Some(parent.id.clone()),
            total_chunks: None,
            position: 0,
            ..parent.metadata.clone()
        };
        self.chunk(&parent.content, metadata)
    }
}

/// Deterministic chunk id from where the text came from and what it says.
///
/// `DefaultHasher::new()` uses fixed keys, so re-indexing the same document
/// yields the same ids.
pub(crate) fn generate_id(content: &str, metadata: &ChunkMetadata) -> String {
    let mut hasher = DefaultHasher::new();
    metadata.source_id.hash(&mut hasher);
    metadata.page.hash(&mut hasher);
    metadata.parent_id.hash(&mut hasher);
    metadata.position.hash(&mut hasher);
    content.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

mod fixed;

pub use fixed::*;
