//! Vector index trait for storing segments and answering nearest-neighbor queries.

use crate::document::{QueryResult, Segment};
use crate::error::Result;

/// An in-process store of `(vector, segment)` pairs with k-nearest-neighbor search.
///
/// All vectors in one index share a single dimension. Implementations rank by
/// ascending distance and break ties by insertion order.
///
/// # Example
///
/// ```rust,ignore
/// use verdant_rag::{FlatIndex, VectorIndex};
///
/// let mut index = FlatIndex::new();
/// index.insert(vec![0.0, 1.0], segment)?;
/// let nearest = index.query(&[0.0, 0.9], 4)?;
/// ```
pub trait VectorIndex: Send + Sync {
    /// The fixed dimension, or `None` while nothing has fixed it yet.
    fn dimension(&self) -> Option<usize>;

    /// Fix the dimension before any vector arrives.
    ///
    /// Succeeds without change if the index already has this dimension and
    /// fails with `DimensionMismatch` if it has another.
    fn set_dimension(&mut self, dimension: usize) -> Result<()>;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    /// Whether the index holds no vectors.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append one pair. Fails if the vector's length differs from [`dimension`](Self::dimension).
    fn insert(&mut self, vector: Vec<f32>, segment: Segment) -> Result<()>;

    /// Append every pair or none of them.
    fn insert_batch(&mut self, entries: Vec<(Vec<f32>, Segment)>) -> Result<()>;

    /// Return up to `k` segments nearest to `vector`, nearest first.
    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<QueryResult>>;
}
