use crate::index::{IndexError, SearchResult, VectorIndex};
use knn_io::{read_matrix, write_matrix, Matrix, TsvError};
use log::info;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Rows queried by the sanity probe and shown in each result preview.
pub const PREVIEW_ROWS: usize = 5;

pub const DEFAULT_OUT_DIR: &str = "../out";
pub const DEFAULT_K: usize = 2;

const INPUT_FILE: &str = "xb.txt";
const DISTANCES_FILE: &str = "D.txt";
const INDICES_FILE: &str = "I.txt";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Tsv(#[from] TsvError),
    #[error("Index error: {0}")]
    Index(#[from] IndexError),
    #[error("Failed to write report: {0}")]
    Report(#[from] io::Error),
}

/// Where the batch reads and writes, and how many neighbours it asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub out_dir: PathBuf,
    pub k: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { out_dir: PathBuf::from(DEFAULT_OUT_DIR), k: DEFAULT_K }
    }
}

impl RunConfig {
    pub fn input_path(&self) -> PathBuf {
        self.out_dir.join(INPUT_FILE)
    }

    pub fn distances_path(&self) -> PathBuf {
        self.out_dir.join(DISTANCES_FILE)
    }

    pub fn indices_path(&self) -> PathBuf {
        self.out_dir.join(INDICES_FILE)
    }
}

/// Everything the batch produced, for callers that want more than the files.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub is_trained: bool,
    pub ntotal: usize,
    pub sanity: SearchResult,
    pub result: SearchResult,
}

/// Runs the batch: load `xb.txt`, index it, query it against itself and
/// persist `D.txt` / `I.txt`.
///
/// # Logic
/// 1. Read the input matrix; its column count is the dimension.
/// 2. `build_index(d)` supplies the engine, then every row is added.
/// 3. Sanity probe over the first `PREVIEW_ROWS` rows (printed, not saved).
/// 4. Full query over every row, written to disk.
///
/// The human-readable report goes to `out`; progress goes to the log.
///
/// # Errors
/// Fails fast on the first I/O, parse or index error. Nothing is retried and
/// output files written before the failure are left as they are.
pub fn run<W, F>(config: &RunConfig, build_index: F, out: &mut W) -> Result<PipelineReport, PipelineError>
where
    W: Write,
    F: FnOnce(usize) -> Box<dyn VectorIndex>,
{
    let input = config.input_path();
    info!("Loading vectors from {}", input.display());
    let xb: Matrix<f32> = read_matrix(&input)?;
    let d = xb.cols();
    info!("Loaded {} vectors of dimension {}", xb.rows(), d);

    let mut index = build_index(d);
    let is_trained = index.is_trained();
    writeln!(out, "{}", is_trained)?;

    index.add(&xb)?;
    let ntotal = index.ntotal();
    info!("Index populated (ntotal = {})", ntotal);
    writeln!(out, "{}", ntotal)?;

    let sanity = index.search(&xb.head(PREVIEW_ROWS), config.k)?;
    writeln!(out, "{}", sanity.labels)?;
    writeln!(out, "{}", sanity.distances)?;

    info!("Searching {} queries (k = {})", xb.rows(), config.k);
    let result = index.search(&xb, config.k)?;
    writeln!(out, "{}", result.labels.head(PREVIEW_ROWS))?;
    writeln!(out, "{}", result.labels.tail(PREVIEW_ROWS))?;

    write_matrix(config.distances_path(), &result.distances)?;
    write_matrix(config.indices_path(), &result.labels)?;
    info!(
        "Wrote {} and {}",
        config.distances_path().display(),
        config.indices_path().display()
    );

    Ok(PipelineReport { is_trained, ntotal, sanity, result })
}
