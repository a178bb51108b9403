// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;
use vgrid_app::Record;
use vgrid_testkit::TransactionFaker;

pub const DEFAULT_DEMO_ROWS: usize = 100_000;
pub const DEFAULT_GENERATED_ROWS: usize = 1_000_000;
pub const DEFAULT_SEED: u64 = 2024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Demo { rows: usize, seed: u64 },
}

/// Loads the whole dataset into memory. Any failure here is terminal for the
/// caller: the grid is never built from a partial load.
pub fn load_records(source: &DataSource) -> Result<Vec<Record>> {
    let started = Instant::now();
    let records = match source {
        DataSource::File(path) => read_dataset(path)?,
        DataSource::Demo { rows, seed } => TransactionFaker::new(*seed).records(*rows),
    };
    tracing::info!(
        source = ?source,
        rows = records.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "dataset loaded"
    );
    Ok(records)
}

fn read_dataset(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).with_context(|| {
        format!(
            "open dataset {} -- if this path is wrong, pass --data, set [data].path or VGRID_DATA_PATH",
            path.display()
        )
    })?;
    vgrid_app::decode_records(BufReader::new(file)).with_context(|| {
        format!(
            "decode dataset {}; expected a JSON array of transaction objects",
            path.display()
        )
    })
}

/// Writes `rows` generated transactions to `path`.
pub fn generate_dataset(path: &Path, rows: usize, seed: u64) -> Result<()> {
    let started = Instant::now();
    let transactions = TransactionFaker::new(seed).transactions(rows);
    vgrid_testkit::write_dataset(path, &transactions)?;
    tracing::info!(
        path = %path.display(),
        rows,
        seed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "dataset generated"
    );
    Ok(())
}
