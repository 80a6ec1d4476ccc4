use anyhow::{Context, Result};
use clap::Parser;
use knn_core::RunConfig;
use std::path::PathBuf;

/// Exact k-NN over `<OUT_DIR>/xb.txt`, writing `D.txt` and `I.txt` next to it.
///
/// Pass both OUT_DIR and K, or neither; any other count falls back to
/// `../out` and 2.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// [OUT_DIR] [K]
    #[arg(value_name = "ARGS", allow_hyphen_values = true, trailing_var_arg = true)]
    pub positional: Vec<String>,
}

impl Args {
    /// Turns the raw positionals into a `RunConfig`.
    ///
    /// # Errors
    /// Fails if two arguments are given and the second is not a non-negative integer.
    pub fn resolve(&self) -> Result<RunConfig> {
        match self.positional.as_slice() {
            [dir, k] => {
                let k = k
                    .parse::<usize>()
                    .with_context(|| format!("Invalid neighbour count K: {:?}", k))?;
                Ok(RunConfig { out_dir: PathBuf::from(dir), k })
            }
            _ => Ok(RunConfig::default()),
        }
    }
}
