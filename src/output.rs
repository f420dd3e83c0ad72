//! Writing curves and batch summaries.
//!
//! Curves are written as long CSV (`curve,frequency,value`), one row per
//! bin; NaN bins are written as `NaN`. Batch summaries are JSON.
//!
//! ## Layout
//!
//! ```text
//! {out}/ratio_before_600s/
//! ├── aggregate.csv
//! ├── summary.json
//! └── cases/
//!     ├── ID=00042,sol=0123.csv
//!     └── sol=0456,hour=12.csv
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::pipeline::{BatchOutcome, CaseId, CaseOutput, CaseRecord, Curve, PipelineConfig};

/// Errors that can occur while writing results
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct CurveRow<'a> {
    curve: &'a str,
    frequency: f64,
    value: f64,
}

/// Write curves to any writer as long CSV.
pub fn write_curves<W: Write>(writer: W, curves: &[Curve]) -> Result<(), OutputError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for curve in curves {
        for (&frequency, &value) in curve.frequency.iter().zip(&curve.values) {
            csv_writer.serialize(CurveRow {
                curve: &curve.name,
                frequency,
                value,
            })?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write curves to a CSV file, creating parent directories.
pub fn write_curves_csv(path: &Path, curves: &[Curve]) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    write_curves(BufWriter::new(File::create(path)?), curves)
}

/// Machine-readable record of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// Selection label
    pub selection: String,
    /// Configuration the batch ran with
    pub config: PipelineConfig,
    /// Cases requested
    pub requested: usize,
    /// Cases that contributed
    pub contributed: usize,
    /// Skipped cases with reasons
    pub skipped: Vec<CaseRecord>,
    /// Names and lengths of the aggregated curves
    pub curves: Vec<CurveSummary>,
    /// Acoustic/gravity-wave border frequency (Hz)
    pub border_frequency: f64,
    /// Wall-clock seconds spent
    pub elapsed_seconds: f64,
}

/// Name and length of one aggregated curve.
#[derive(Debug, Clone, Serialize)]
pub struct CurveSummary {
    /// Curve name
    pub name: String,
    /// Number of bins
    pub bins: usize,
    /// Number of non-NaN values
    pub finite: usize,
}

impl BatchSummary {
    /// Summarise a batch outcome.
    pub fn from_outcome(selection: impl Into<String>, config: &PipelineConfig, outcome: &BatchOutcome) -> Self {
        Self {
            selection: selection.into(),
            config: config.clone(),
            requested: outcome.report.records.len(),
            contributed: outcome.report.ok_count(),
            skipped: outcome.report.skipped().cloned().collect(),
            curves: outcome
                .curves
                .iter()
                .map(|c| CurveSummary {
                    name: c.name.clone(),
                    bins: c.len(),
                    finite: c.values.iter().filter(|v| !v.is_nan()).count(),
                })
                .collect(),
            border_frequency: outcome.border_frequency,
            elapsed_seconds: outcome.elapsed_seconds,
        }
    }

    /// Write as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), OutputError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Directory name for a configuration (`ratio_before_600s`).
pub fn run_dir_name(config: &PipelineConfig) -> String {
    let mut name = format!("{}_{}_{}s", config.statistic, config.window.label(), config.window.duration());
    if let Some(offset) = config.window.offset() {
        name.push_str(&format!("_lag{}s", offset));
    }
    if let Some(cadence) = config.resample {
        name.push_str(&format!("_rs{}s", cadence));
    }
    name
}

/// File name for one case (`ID=00042,sol=0123.csv`).
pub fn case_file_name(case: CaseId, sol: u32) -> String {
    match case {
        CaseId::Event(id) => format!("ID={:05},sol={:04}.csv", id, sol),
        CaseId::QuietSol { hour, .. } => format!("sol={:04},hour={:02}.csv", sol, hour),
    }
}

/// Write one case's curves under `dir`, returning the file path.
pub fn write_case(dir: &Path, output: &CaseOutput) -> Result<PathBuf, OutputError> {
    let path = dir.join(case_file_name(output.case, output.sol));
    write_curves_csv(&path, &output.curves)?;
    Ok(path)
}

/// Write a batch's aggregate, summary and optionally per-case files.
///
/// Returns the run directory.
pub fn write_batch(
    out_dir: &Path,
    selection: &str,
    config: &PipelineConfig,
    outcome: &BatchOutcome,
    per_case: bool,
) -> Result<PathBuf, OutputError> {
    let run_dir = out_dir.join(run_dir_name(config));
    write_curves_csv(&run_dir.join("aggregate.csv"), &outcome.curves)?;
    BatchSummary::from_outcome(selection, config, outcome).write_json(&run_dir.join("summary.json"))?;
    if per_case {
        let cases_dir = run_dir.join("cases");
        for output in &outcome.cases {
            write_case(&cases_dir, output)?;
        }
    }
    info!("Wrote batch results to {}", run_dir.display());
    Ok(run_dir)
}
