//! Data types for documents, segments, and query results.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where inside its source file a [`Document`] came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceLocation {
    /// A PDF page, 0-based.
    Page(usize),
    /// A CSV data row, 0-based (the header is not counted).
    Row(usize),
}

/// A loaded unit of text with its source metadata.
///
/// Produced by the [`DocumentStore`](crate::loader::DocumentStore) and consumed
/// by a [`Chunker`](crate::chunking::Chunker).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document, e.g. `report.pdf#page=3`.
    pub id: String,
    /// The text content of the document.
    pub text: String,
    /// The file the document was read from.
    pub source: PathBuf,
    /// Page or row within `source`.
    pub location: SourceLocation,
    /// Key-value metadata (`source`, `page`/`row`, extra CSV columns).
    pub metadata: HashMap<String, String>,
}

/// A contiguous window of a [`Document`]'s text.
///
/// Offsets are counted in characters, not bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    /// Unique identifier, `{document_id}_{index}`.
    pub id: String,
    /// The text content of the segment.
    pub text: String,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// Ordinal of this segment within its document.
    pub index: usize,
    /// Character offset of the first character in the parent text.
    pub char_start: usize,
    /// Character offset one past the last character in the parent text.
    pub char_end: usize,
    /// Metadata inherited from the parent document plus `chunk_index`.
    pub metadata: HashMap<String, String>,
}

/// A retrieved [`Segment`] paired with its distance to the query vector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    /// The retrieved segment.
    pub segment: Segment,
    /// Squared Euclidean distance (lower is more relevant).
    pub distance: f32,
}
