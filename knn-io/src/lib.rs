//! KNN I/O: dense matrices and the tab-separated text format.
//!
//! Vectors enter and leave the system as plain TSV files, one row per line.
//! This crate owns the in-memory `Matrix` layout shared by the index and the
//! reader/writer pair that moves it to and from disk.

pub mod matrix;
pub mod tsv;

// Re-exports for easier access by knn-core
pub use matrix::{Matrix, ShapeError};
pub use tsv::{read_matrix, write_matrix, TsvError, TsvField};
