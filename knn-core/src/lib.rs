//! KNN Core: the exact search engine and the batch pipeline that drives it.

pub mod index;
pub mod pipeline;

pub use index::flat::FlatL2Index;
pub use index::{IndexError, SearchResult, VectorIndex};
pub use pipeline::{run, PipelineError, PipelineReport, RunConfig};
