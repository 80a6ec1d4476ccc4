use super::distance::l2_distance;
use super::{IndexError, SearchResult, VectorIndex, MAX_RESULT_CELLS, MISSING_DISTANCE, MISSING_LABEL};
use knn_io::Matrix;
use log::{debug, warn};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f32,
    node_id: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

// Max-heap order: the worst kept candidate sits on top. Equal distances rank
// the higher row as worse, so the earliest inserted vector wins ties.
impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.node_id.cmp(&other.node_id))
    }
}

/// Exact brute-force index under squared L2 distance.
///
/// Vectors are kept uncompressed in one contiguous arena, in insertion order.
/// A search compares the query against every stored vector, which makes this
/// the baseline other engines are measured against.
///
/// # Short results
/// When `k` exceeds the number of stored vectors, each result row is padded
/// up to `k` with label `-1` and distance `f32::MAX`. A batch whose
/// `queries * k` exceeds `MAX_RESULT_CELLS` (or cannot be allocated) fails
/// with `IndexError::ResultTooLarge`.
pub struct FlatL2Index {
    dimension: usize,
    count: usize,
    arena: Vec<f32>,
}

impl FlatL2Index {
    pub fn new(dimension: usize) -> Self {
        Self { dimension, count: 0, arena: Vec::new() }
    }

    #[inline]
    fn vector(&self, node_id: usize) -> &[f32] {
        let start = node_id * self.dimension;
        &self.arena[start..start + self.dimension]
    }

    fn check_dimension(&self, actual: usize) -> Result<(), IndexError> {
        if actual != self.dimension {
            return Err(IndexError::DimensionMismatch { expected: self.dimension, actual });
        }
        Ok(())
    }

    /// Top-k for a single query, ascending by (distance, row).
    fn search_one(&self, query: &[f32], k: usize) -> Vec<Candidate> {
        let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k.min(self.count) + 1);

        for node_id in 0..self.count {
            let candidate = Candidate { distance: l2_distance(query, self.vector(node_id)), node_id };
            if heap.len() < k {
                heap.push(candidate);
            } else if let Some(worst) = heap.peek() {
                if candidate < *worst {
                    heap.pop();
                    heap.push(candidate);
                }
            }
        }

        heap.into_sorted_vec()
    }
}

impl VectorIndex for FlatL2Index {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn is_trained(&self) -> bool {
        true
    }

    fn ntotal(&self) -> usize {
        self.count
    }

    fn add(&mut self, vectors: &Matrix<f32>) -> Result<(), IndexError> {
        self.check_dimension(vectors.cols())?;
        self.arena.extend_from_slice(vectors.as_slice());
        self.count += vectors.rows();
        debug!("FlatL2Index: added {} vectors (ntotal = {})", vectors.rows(), self.ntotal());
        Ok(())
    }

    fn search(&self, queries: &Matrix<f32>, k: usize) -> Result<SearchResult, IndexError> {
        self.check_dimension(queries.cols())?;

        let ntotal = self.ntotal();
        if k > ntotal {
            warn!("FlatL2Index: k = {} exceeds ntotal = {}; padding results with label -1", k, ntotal);
        }

        let n = queries.rows();
        let too_large = IndexError::ResultTooLarge { queries: n, k };
        let cells = match n.checked_mul(k) {
            Some(cells) if cells <= MAX_RESULT_CELLS => cells,
            _ => return Err(too_large),
        };

        let mut distances: Vec<f32> = Vec::new();
        let mut labels: Vec<i64> = Vec::new();
        if distances.try_reserve_exact(cells).is_err() || labels.try_reserve_exact(cells).is_err() {
            return Err(too_large);
        }

        for query in queries.rows_iter() {
            let hits = self.search_one(query, k);
            let missing = k - hits.len();
            for hit in hits {
                distances.push(hit.distance);
                labels.push(hit.node_id as i64);
            }
            distances.extend(std::iter::repeat(MISSING_DISTANCE).take(missing));
            labels.extend(std::iter::repeat(MISSING_LABEL).take(missing));
        }

        debug!("FlatL2Index: searched {} queries, k = {}", n, k);

        Ok(SearchResult {
            distances: Matrix::from_vec(n, k, distances)?,
            labels: Matrix::from_vec(n, k, labels)?,
        })
    }
}
