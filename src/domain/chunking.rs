//! Fixed-size character windows with overlap.
//!
//! Sizes and offsets are counted in `char`s, never bytes, so a window never
//! splits a multi-byte character.

use serde::{Deserialize, Serialize};

use crate::domain::{errors::DomainError, Document, DocumentChunk};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    chunk_size: usize,
    overlap: usize,
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, DomainError> {
        if chunk_size == 0 {
            return Err(DomainError::configuration("chunk size must be positive"));
        }
        if overlap >= chunk_size {
            return Err(DomainError::configuration(format!(
                "chunk overlap ({overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    pub fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

/// A window into the source text, `[start, end)` in chars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Splits `text` into overlapping windows.
///
/// Each window starts `chunk_size - overlap` chars after the previous one.
/// Splitting stops as soon as a window reaches the end of the text, so text
/// no longer than `chunk_size` yields exactly one chunk and empty text none.
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<TextChunk> {
    // Byte offset of every char boundary, including the end of the string.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = boundaries.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < char_len {
        let end = (start + config.chunk_size).min(char_len);
        chunks.push(TextChunk {
            text: text[boundaries[start]..boundaries[end]].to_string(),
            start,
            end,
        });
        if end == char_len {
            break;
        }
        start += config.step();
    }

    chunks
}

pub fn chunk_document(document: &Document, config: &ChunkingConfig) -> Vec<DocumentChunk> {
    chunk_text(&document.content, config)
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| {
            DocumentChunk::new(document.id, chunk.text, index, chunk.start, chunk.end)
        })
        .collect()
}
