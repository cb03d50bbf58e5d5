use std::iter;

use crate::chunk::{generate_id, Chunk, ChunkMetadata, Chunker};
use crate::{Error, Result};

/// Fixed-size chunker - splits by character count
///
/// Consecutive windows share exactly `overlap` characters. Only the last
/// window of a text may be shorter than `chunk_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    overlap: usize,
}

impl FixedSizeChunker {
    /// Create a chunker, rejecting sizes that would never advance.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Config("chunk size must be positive".to_string()));
        }
        if overlap >= chunk_size {
            return Err(Error::Config(format!(
                "overlap {overlap} must be smaller than chunk size {chunk_size}"
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Maximum chunk length in characters
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Characters shared between neighbouring chunks
    pub fn overlap(&self) -> usize {
        self.overlap
    }
}

impl Chunker for FixedSizeChunker {
    fn name(&self) -> &str {
        "fixed"
    }

    fn chunk(&self, content: &str, mut metadata: ChunkMetadata) -> Vec<Chunk> {
        // byte offset of every char start, plus the end of the string
        let offsets: Vec<usize> = content
            .char_indices()
            .map(|(i, _)| i)
            .chain(iter::once(content.len()))
            .collect();
        let len = offsets.len() - 1;
        if len == 0 {
            return Vec::new();
        }

        let stride = self.chunk_size - self.overlap;
        let total = if len <= self.chunk_size {
            1
        } else {
            (len - self.chunk_size).div_ceil(stride) + 1
        };
        metadata.total_chunks = Some(total);

        let mut chunks = Vec::with_capacity(total);
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(len);
            let c = &content[offsets[start]..offsets[end]];

            // clone metadata and add chunk specific info
            let mut m = metadata.clone();
            m.position = start;

            chunks.push(Chunk {
                id: generate_id(c, &m),
                content: c.to_string(),
                metadata: m,
            });

            if end == len {
                break;
            }
            start += stride;
        }

        debug_assert_eq!(chunks.len(), total);
        chunks
    }
}
