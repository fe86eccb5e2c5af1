// src/chunker.rs
// Fixed-window document chunking with tail merging

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1500;
pub const DEFAULT_MIN_CHUNK_SIZE: usize = 700;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in the chunk sequence (0-based)
    pub index: usize,
    pub text: String,
}

impl Chunk {
    /// Length in characters, the unit the size bounds are expressed in
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error("invalid chunk parameters: max_size={max_size}, min_size={min_size} (need 0 < min_size < max_size)")]
    InvalidParameters { max_size: usize, min_size: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkerConfig {
    pub max_size: usize, // upper bound of a window, in chars
    pub min_size: usize, // windows at or below this merge into the previous chunk
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_CHUNK_SIZE,
            min_size: DEFAULT_MIN_CHUNK_SIZE,
        }
    }
}

impl ChunkerConfig {
    pub fn new(max_size: usize, min_size: usize) -> Result<Self, ChunkError> {
        let config = Self { max_size, min_size };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.min_size == 0 || self.max_size == 0 || self.min_size >= self.max_size {
            return Err(ChunkError::InvalidParameters {
                max_size: self.max_size,
                min_size: self.min_size,
            });
        }
        Ok(())
    }

    pub fn split(&self, text: &str) -> Result<Vec<Chunk>, ChunkError> {
        split(text, self.max_size, self.min_size)
    }
}

/// Split `text` into consecutive windows of at most `max_size` chars.
///
/// A window of `min_size` chars or fewer is appended to the previous chunk
/// instead of starting a new one. When there is no previous chunk (the whole
/// document fits in one undersized window) it becomes the only chunk.
/// Concatenating the returned chunks always reproduces `text`.
pub fn split(text: &str, max_size: usize, min_size: usize) -> Result<Vec<Chunk>, ChunkError> {
    ChunkerConfig { max_size, min_size }.validate()?;

    let mut chunks: Vec<Chunk> = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let end = window_end(text, start, max_size);
        let slice = &text[start..end];

        if slice.chars().count() > min_size {
            chunks.push(Chunk {
                index: chunks.len(),
                text: slice.to_string(),
            });
        } else if let Some(previous) = chunks.last_mut() {
            previous.text.push_str(slice);
        } else {
            chunks.push(Chunk {
                index: 0,
                text: slice.to_string(),
            });
        }

        start = end;
    }

    tracing::debug!(
        chars = text.chars().count(),
        chunks = chunks.len(),
        max_size,
        min_size,
        "Document split into chunks"
    );

    Ok(chunks)
}

/// Byte offset `max_chars` characters after `start`, clamped to the end of `text`
fn window_end(text: &str, start: usize, max_chars: usize) -> usize {
    text[start..]
        .char_indices()
        .nth(max_chars)
        .map(|(offset, _)| start + offset)
        .unwrap_or(text.len())
}
