use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use dustspec::loader::ingest_raw_file;

/// Convert a raw instrument table into a per-sol pressure file
pub fn run(raw: PathBuf, output: Option<PathBuf>) -> Result<()> {
    if !raw.exists() {
        anyhow::bail!("File does not exist: {}", raw.display());
    }

    info!("Ingesting {}", raw.display());
    let written = ingest_raw_file(&raw, output.as_deref())
        .with_context(|| format!("Failed to ingest {}", raw.display()))?;

    println!("{}", written.display());
    Ok(())
}
