//! # dustspec
//!
//! Command-line front end for the dust devil spectral pipeline.
//!
//! ## Usage
//!
//! ```bash
//! # Convert a raw instrument table into ps_calib_NNNN.csv
//! dustspec ingest raw/sol0123.csv
//!
//! # One event, power ratio in the 600 s before it
//! dustspec --catalog catalog.csv --data-dir data event 4821
//!
//! # All events deeper than -2 Pa, corrected ratio on a 0.5 s grid
//! dustspec --config dustspec.toml batch --pressure-drop -2 --preset near-moving
//!
//! # Quiet-sol baseline at 12:00 local time
//! dustspec --data-dir data batch --quiet-hour 12
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
