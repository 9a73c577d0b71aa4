//! Exact in-memory vector index using squared Euclidean distance.
//!
//! This module provides [`FlatIndex`], a brute-force index backed by a `Vec`
//! of entries in insertion order. Every query scans all entries, which gives
//! exact results and deterministic tie-breaking.

use tracing::debug;

use crate::document::{QueryResult, Segment};
use crate::error::{RagError, Result};
use crate::index::VectorIndex;

/// Squared Euclidean distance between two vectors of equal length.
///
/// Monotonic with the Euclidean distance, so ranking is unchanged without the
/// square root.
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// A brute-force [`VectorIndex`].
///
/// The dimension is fixed either up front with [`FlatIndex::with_dimension`]
/// or by the first insertion.
#[derive(Debug, Clone, Default)]
pub struct FlatIndex {
    dimension: Option<usize>,
    entries: Vec<(Vec<f32>, Segment)>,
}

impl FlatIndex {
    /// Create an empty index whose dimension is set by the first insertion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty index that only accepts vectors of length `dimension`.
    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension: Some(dimension), entries: Vec::new() }
    }

    /// Iterate over stored segments in insertion order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.entries.iter().map(|(_, segment)| segment)
    }
}

/// Accept `vector` if its length matches `expected`, returning that length.
fn check_dimension(expected: Option<usize>, vector: &[f32]) -> Result<usize> {
    let actual = vector.len();
    match expected {
        Some(expected) if expected != actual => Err(RagError::DimensionMismatch { expected, actual }),
        _ => Ok(actual),
    }
}

impl VectorIndex for FlatIndex {
    fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    fn set_dimension(&mut self, dimension: usize) -> Result<()> {
        match self.dimension {
            Some(expected) if expected != dimension => {
                Err(RagError::DimensionMismatch { expected, actual: dimension })
            }
            _ => {
                self.dimension = Some(dimension);
                Ok(())
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn insert(&mut self, vector: Vec<f32>, segment: Segment) -> Result<()> {
        let dimension = check_dimension(self.dimension, &vector)?;
        self.dimension = Some(dimension);
        self.entries.push((vector, segment));
        Ok(())
    }

    fn insert_batch(&mut self, entries: Vec<(Vec<f32>, Segment)>) -> Result<()> {
        let mut dimension = self.dimension;
        for (vector, _) in &entries {
            dimension = Some(check_dimension(dimension, vector)?);
        }

        let added = entries.len();
        self.dimension = dimension;
        self.entries.extend(entries);
        debug!(added, total = self.entries.len(), "extended flat index");
        Ok(())
    }

    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<QueryResult>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        if self.entries.is_empty() {
            return Err(RagError::EmptyIndex);
        }
        check_dimension(self.dimension, vector)?;

        let mut ranked: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, (stored, _))| (position, squared_euclidean(stored, vector)))
            .collect();

        // `sort_by` is stable, so equal distances keep insertion order.
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.truncate(k);

        Ok(ranked
            .into_iter()
            .map(|(position, distance)| QueryResult {
                segment: self.entries[position].1.clone(),
                distance,
            })
            .collect())
    }
}
