pub mod distance;
pub mod flat;

use knn_io::{Matrix, ShapeError};
use thiserror::Error;

/// Label reported for result slots that no stored vector could fill.
pub const MISSING_LABEL: i64 = -1;

/// Distance reported alongside `MISSING_LABEL`.
pub const MISSING_DISTANCE: f32 = f32::MAX;

/// Upper bound on `queries * k` for one batch search (about 3 GiB of output).
pub const MAX_RESULT_CELLS: usize = 1 << 28;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IndexError {
    #[error("Dimension mismatch: index holds {expected}-d vectors, got {actual}-d")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Result of {queries} queries x k = {k} is too large to allocate")]
    ResultTooLarge { queries: usize, k: usize },
    #[error(transparent)]
    Layout(#[from] ShapeError),
}

/// Output of a batch query: two `queries x k` matrices sharing one layout.
///
/// `labels[i][j]` is the row (insertion position) of the j-th closest stored
/// vector to query `i`, and `distances[i][j]` its squared L2 distance.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub distances: Matrix<f32>,
    pub labels: Matrix<i64>,
}

/// Batch nearest-neighbour engine.
///
/// The pipeline only talks to this trait, so any exact or approximate engine
/// can stand in for the flat index.
pub trait VectorIndex {
    /// Vector length fixed at construction.
    fn dimension(&self) -> usize;

    /// Whether the index is ready for `add`/`search` without a training pass.
    fn is_trained(&self) -> bool;

    /// Number of stored vectors.
    fn ntotal(&self) -> usize;

    /// Appends every row of `vectors`, in order. Labels continue from `ntotal()`.
    fn add(&mut self, vectors: &Matrix<f32>) -> Result<(), IndexError>;

    /// Returns the `k` nearest stored vectors for every row of `queries`,
    /// ascending by distance.
    fn search(&self, queries: &Matrix<f32>, k: usize) -> Result<SearchResult, IndexError>;
}
