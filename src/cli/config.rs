//! TOML configuration file support.
//!
//! Instead of passing many CLI flags, users can keep paths and pipeline
//! settings in a config file:
//!
//! ```toml
//! # dustspec.toml
//! [paths]
//! catalog = "catalog/dustdevil_catalog.csv"
//! data_dir = "data/ps_calib"
//! output_dir = "results"
//!
//! [pipeline]
//! statistic = "corrected_ratio"
//! kind = "power"
//! resample = 0.5
//! smoothing_window = 11
//! ratio_window = 5
//!
//! [pipeline.window]
//! mode = "before"
//! duration = 600.0
//! offset = 20.0
//! ```
//!
//! Explicit CLI flags override file values; file values override presets
//! and defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use dustspec::aggregate::{AggregationPolicy, Reduction};
use dustspec::pipeline::{PipelineConfig, Statistic, WindowSpec};
use dustspec::spectral::SpectralKind;

/// Root configuration structure for dustspec.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Pipeline settings.
    #[serde(default)]
    pub pipeline: PipelineSection,
}

/// File locations.
#[derive(Debug, Default, Deserialize)]
pub struct PathsConfig {
    /// Event catalog CSV.
    pub catalog: Option<PathBuf>,

    /// Directory of per-sol pressure files.
    pub data_dir: Option<PathBuf>,

    /// Directory results are written under.
    pub output_dir: Option<PathBuf>,
}

/// Pipeline settings; every key is optional.
#[derive(Debug, Default, Deserialize)]
pub struct PipelineSection {
    /// Window placement and length.
    pub window: Option<WindowSpec>,

    /// Resample cadence (s).
    pub resample: Option<f64>,

    /// Spectrum kind.
    pub kind: Option<SpectralKind>,

    /// Derived statistic.
    pub statistic: Option<Statistic>,

    /// Log-space smoothing window.
    pub smoothing_window: Option<usize>,

    /// Ratio re-smoothing window.
    pub ratio_window: Option<usize>,

    /// Frequency ceiling (Hz).
    pub frequency_ceiling: Option<f64>,

    /// Aggregation policy.
    pub policy: Option<AggregationPolicy>,

    /// Reduction across cases.
    pub reduction: Option<Reduction>,
}

impl PipelineSection {
    /// Overwrite the fields of `config` that this section sets.
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(window) = self.window {
            config.window = window;
        }
        if self.resample.is_some() {
            config.resample = self.resample;
        }
        if let Some(kind) = self.kind {
            config.kind = kind;
        }
        if let Some(statistic) = self.statistic {
            config.statistic = statistic;
        }
        if let Some(size) = self.smoothing_window {
            config.smoothing_window = size;
        }
        if let Some(size) = self.ratio_window {
            config.ratio_window = size;
        }
        if self.frequency_ceiling.is_some() {
            config.frequency_ceiling = self.frequency_ceiling;
        }
        if let Some(policy) = self.policy {
            config.policy = policy;
        }
        if let Some(reduction) = self.reduction {
            config.reduction = reduction;
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load the file when a path was given.
    pub fn load_optional(path: Option<&Path>) -> Result<Option<Self>> {
        path.map(Self::from_file).transpose()
    }
}
