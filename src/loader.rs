//! Per-sol pressure file loading and raw instrument ingestion.
//!
//! The analytical core never touches the filesystem; it receives a
//! [`PressureSeries`] from a [`SolSource`]. [`CsvSolDirectory`] is the
//! on-disk implementation reading one `ps_calib_NNNN.csv` file per sol.
//!
//! ## Sol file layout
//!
//! | Column | Description |
//! |--------|-------------|
//! | MUTC | Local civil timestamp (`YYYY-MM-DD HH:MM:SS.ffffff`) |
//! | LMST | Local mean solar time label |
//! | LTST | Local true solar time label (`SSSSS HH:MM:SS`) |
//! | UTC | Earth UTC stamp (`YYYY-DDDTHH:MM:SS.fffZ`) |
//! | p | Pressure (Pa) |

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;

use crate::clock;
use crate::error::AnalysisError;
use crate::series::{PressureSample, PressureSeries};

/// Errors that can occur while loading or ingesting pressure files
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// I/O error reading a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// A row could not be interpreted
    #[error("{path}:{line}: {message}")]
    Parse {
        /// File being read
        path: String,
        /// 1-based line number
        line: u64,
        /// What went wrong
        message: String,
    },

    /// Nothing could be loaded for the requested sols
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Source of per-sol pressure series.
///
/// `Ok(None)` means the sol has no file; this is reported, not retried.
pub trait SolSource: Sync {
    /// Load all samples stored for `sol`.
    fn load_sol(&self, sol: u32) -> Result<Option<PressureSeries>, LoadError>;
}

/// Directory of `ps_calib_NNNN.csv` files.
#[derive(Debug, Clone)]
pub struct CsvSolDirectory {
    root: PathBuf,
}

impl CsvSolDirectory {
    /// Create a source rooted at `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Directory the files are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `sol`.
    pub fn sol_path(&self, sol: u32) -> PathBuf {
        self.root.join(sol_file_name(sol))
    }
}

impl SolSource for CsvSolDirectory {
    fn load_sol(&self, sol: u32) -> Result<Option<PressureSeries>, LoadError> {
        let path = self.sol_path(sol);
        if !path.exists() {
            warn!("Pressure file not found: {}", path.display());
            return Ok(None);
        }
        let file = File::open(&path)?;
        let series = read_sol_file(file, &path.display().to_string())?;
        debug!("Loaded {} samples from {}", series.len(), path.display());
        Ok(Some(series))
    }
}

/// File name for a sol (`ps_calib_0042.csv`).
pub fn sol_file_name(sol: u32) -> String {
    format!("ps_calib_{:04}.csv", sol)
}

/// Parse a sol file from any reader. `label` is used in error messages.
pub fn read_sol_file<R: Read>(reader: R, label: &str) -> Result<PressureSeries, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut samples = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let parse_error = |message: String| LoadError::Parse {
            path: label.to_string(),
            line,
            message,
        };

        let timestamp = record
            .get(0)
            .ok_or_else(|| parse_error("missing MUTC column".to_string()))?;
        let timestamp = clock::parse_local_time(timestamp)
            .map_err(|e| parse_error(format!("invalid MUTC '{}': {}", timestamp, e)))?;
        let ltst = record.get(2).unwrap_or_default().trim().to_string();
        let pressure = parse_optional_f64(record.get(4).unwrap_or_default())
            .map_err(|e| parse_error(format!("invalid pressure: {}", e)))?;

        samples.push(PressureSample::new(timestamp, ltst, pressure));
    }

    Ok(PressureSeries::from_samples(samples))
}

/// Parse a float where an empty cell means "missing" (NaN).
pub(crate) fn parse_optional_f64(value: &str) -> Result<f64, std::num::ParseFloatError> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        Ok(f64::NAN)
    } else {
        value.parse()
    }
}

/// Load `sol - 1`, `sol`, `sol + 1` and merge them.
///
/// Events near midnight need samples from the neighbouring sols.
pub fn load_surrounding<S: SolSource + ?Sized>(source: &S, sol: u32) -> Result<PressureSeries, LoadError> {
    let sols = sol.saturating_sub(1)..=sol.saturating_add(1);
    let mut parts = Vec::with_capacity(3);
    for s in sols {
        if let Some(series) = source.load_sol(s)? {
            parts.push(series);
        }
    }
    if parts.is_empty() {
        return Err(AnalysisError::NoData(format!("no pressure files around sol {}", sol)).into());
    }
    Ok(PressureSeries::concat(parts))
}

/// Load the samples that belong to `sol` itself (by LTST label), pulling
/// from the neighbouring files as well.
pub fn load_daily<S: SolSource + ?Sized>(source: &S, sol: u32) -> Result<PressureSeries, LoadError> {
    let mut series = load_surrounding(source, sol)?;
    series.retain_sol(sol);
    if series.is_empty() {
        return Err(AnalysisError::NoData(format!("no samples labelled sol {}", sol)).into());
    }
    Ok(series)
}

/// One row of a sol file as written by [`write_sol_file`].
#[derive(Debug, Clone, Serialize)]
pub struct SolFileRow {
    /// Local civil timestamp
    #[serde(rename = "MUTC")]
    pub local_time: String,
    /// Local mean solar time label
    #[serde(rename = "LMST")]
    pub lmst: String,
    /// Local true solar time label
    #[serde(rename = "LTST")]
    pub ltst: String,
    /// Earth UTC stamp, verbatim
    #[serde(rename = "UTC")]
    pub utc: String,
    /// Pressure (Pa)
    #[serde(rename = "p")]
    pub pressure: f64,
}

/// Convert a raw instrument export into sol-file rows.
///
/// Raw files carry one header line and the columns `LMST, LTST, UTC, p`
/// at positions 2..=5 (further temperature/frequency columns are ignored).
/// The local civil timestamp is the LTST label's sol and time of day plus
/// the fractional seconds of the UTC stamp.
pub fn ingest_raw<R: Read>(reader: R, label: &str) -> Result<Vec<SolFileRow>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let parse_error = |message: String| LoadError::Parse {
            path: label.to_string(),
            line,
            message,
        };

        let field = |i: usize| record.get(i).unwrap_or_default().trim();
        let (lmst, ltst, utc) = (field(2), field(3), field(4));

        let (sol, time) = clock::parse_ltst_label(ltst)
            .ok_or_else(|| parse_error(format!("invalid LTST label '{}'", ltst)))?;
        let utc_time = clock::parse_utc(utc)
            .map_err(|e| parse_error(format!("invalid UTC '{}': {}", utc, e)))?;
        let pressure = parse_optional_f64(field(5))
            .map_err(|e| parse_error(format!("invalid pressure: {}", e)))?;

        let local_time = clock::sol_date(sol).and_time(time)
            + chrono::Duration::nanoseconds(i64::from(clock::subsec_nanos(utc_time)));

        rows.push(SolFileRow {
            local_time: local_time.format(clock::LOCAL_TIME_FORMAT).to_string(),
            lmst: lmst.to_string(),
            ltst: ltst.to_string(),
            utc: utc.to_string(),
            pressure,
        });
    }

    Ok(rows)
}

/// Write sol-file rows as CSV.
pub fn write_sol_file<W: Write>(writer: W, rows: &[SolFileRow]) -> Result<(), LoadError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Ingest a raw instrument file and write the converted sol file.
///
/// When `output` is `None` the file is written next to the input as
/// `ps_calib_NNNN.csv`, using the sol of the first record.
pub fn ingest_raw_file(input: &Path, output: Option<&Path>) -> Result<PathBuf, LoadError> {
    let rows = ingest_raw(File::open(input)?, &input.display().to_string())?;
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => {
            let sol = rows
                .first()
                .and_then(|r| clock::parse_ltst_label(&r.ltst))
                .map(|(sol, _)| sol)
                .ok_or_else(|| AnalysisError::NoData(format!("{} holds no records", input.display())))?;
            input.with_file_name(sol_file_name(sol))
        }
    };

    write_sol_file(File::create(&output)?, &rows)?;
    info!("Save completed: {} ({} rows)", output.display(), rows.len());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SOL_FILE: &str = "MUTC,LMST,LTST,UTC,p\n\
        2018-12-06 10:00:00.000000,00010 09:40:00,00010 10:00:00,2018-340T05:00:00.000Z,700.5\n\
        2018-12-06 10:00:01.000000,00010 09:40:01,00010 10:00:01,2018-340T05:00:01.000Z,\n\
        2018-12-06 10:00:01.000000,00010 09:40:01,00010 10:00:01,2018-340T05:00:01.000Z,999.0\n";

    struct MemorySource(HashMap<u32, PressureSeries>);

    impl SolSource for MemorySource {
        fn load_sol(&self, sol: u32) -> Result<Option<PressureSeries>, LoadError> {
            Ok(self.0.get(&sol).cloned())
        }
    }

    #[test]
    fn test_read_sol_file_missing_pressure_is_nan_and_duplicates_dropped() {
        let series = read_sol_file(SOL_FILE.as_bytes(), "mem").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.samples()[0].pressure, 700.5);
        assert!(series.samples()[1].pressure.is_nan());
        assert_eq!(series.samples()[0].ltst, "00010 10:00:00");
    }

    #[test]
    fn test_read_sol_file_bad_timestamp() {
        let bad = "MUTC,LMST,LTST,UTC,p\nnot-a-date,a,b,c,1.0\n";
        let err = read_sol_file(bad.as_bytes(), "mem").unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_load_surrounding_and_daily() {
        let series = read_sol_file(SOL_FILE.as_bytes(), "mem").unwrap();
        let source = MemorySource(HashMap::from([(10, series)]));

        assert_eq!(load_surrounding(&source, 11).unwrap().len(), 2);
        assert!(matches!(
            load_daily(&source, 11),
            Err(LoadError::Analysis(AnalysisError::NoData(_)))
        ));
        assert!(matches!(
            load_surrounding(&source, 20),
            Err(LoadError::Analysis(AnalysisError::NoData(_)))
        ));
    }

    #[test]
    fn test_ingest_raw_derives_local_time() {
        let raw = "a,b,LMST,LTST,UTC,p,pf,t,tf\n\
            0,0,00012 08:00:00,00012 08:30:15,2018-343T01:02:03.250Z,701.25,1,2,3\n";
        let rows = ingest_raw(raw.as_bytes(), "raw").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].local_time, "2018-12-08 08:30:15.250000");
        assert_eq!(rows[0].pressure, 701.25);

        let mut out = Vec::new();
        write_sol_file(&mut out, &rows).unwrap();
        let back = read_sol_file(out.as_slice(), "roundtrip").unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back.samples()[0].ltst, "00012 08:30:15");
    }
}
