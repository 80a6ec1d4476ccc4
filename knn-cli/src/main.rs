use anyhow::{Context, Result};
use clap::Parser;
use knn_core::{run, FlatL2Index};
use log::info;
use std::io;

mod config;

use config::Args;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = args.resolve()?;
    info!("Starting KNN batch (out_dir = {}, k = {})", config.out_dir.display(), config.k);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let report = run(&config, |d| Box::new(FlatL2Index::new(d)), &mut out)
        .with_context(|| format!("KNN batch failed in {}", config.out_dir.display()))?;

    info!("Done: {} vectors searched", report.ntotal);
    Ok(())
}
