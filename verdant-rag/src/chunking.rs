//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`FixedSizeChunker`], a
//! sliding-window splitter with a fixed overlap between consecutive segments.

use crate::config::RagConfig;
use crate::document::{Document, Segment};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into segments.
pub trait Chunker: Send + Sync {
    /// Split a document into segments, in text order.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    fn chunk(&self, document: &Document) -> Vec<Segment>;
}

/// Splits text into windows of `chunk_size` characters, each starting
/// `chunk_size - chunk_overlap` characters after the previous one.
///
/// Sizes are counted in characters so a window never splits a code point.
/// Segment IDs are generated as `{document_id}_{index}`. Each segment inherits
/// the parent document's metadata plus a `chunk_index` field.
///
/// # Example
///
/// ```rust,ignore
/// use verdant_rag::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(1000, 200)?;
/// let segments = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::ConfigError("chunk_size must be greater than zero".into()));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Create a chunker from an already validated [`RagConfig`].
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Maximum number of characters per segment.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of characters shared by consecutive segments.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Compute `(char_start, char_end)` windows for a text of `char_count` characters.
    pub fn windows(&self, char_count: usize) -> Vec<(usize, usize)> {
        let mut windows = Vec::new();
        if char_count == 0 {
            return windows;
        }

        let step = self.chunk_size - self.chunk_overlap;
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(char_count);
            windows.push((start, end));
            if end == char_count {
                break;
            }
            start += step;
        }
        windows
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Segment> {
        let text = &document.text;
        // Byte offset of every char boundary, including the end of the text.
        let boundaries: Vec<usize> =
            text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let char_count = boundaries.len() - 1;

        self.windows(char_count)
            .into_iter()
            .enumerate()
            .map(|(index, (char_start, char_end))| {
                let mut metadata = document.metadata.clone();
                metadata.insert("chunk_index".to_string(), index.to_string());

                Segment {
                    id: format!("{}_{index}", document.id),
                    text: text[boundaries[char_start]..boundaries[char_end]].to_string(),
                    document_id: document.id.clone(),
                    index,
                    char_start,
                    char_end,
                    metadata,
                }
            })
            .collect()
    }
}
