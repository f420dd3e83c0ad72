//! # dustspec - Spectral Signatures of Dust Devil Pressure Events
//!
//! `dustspec` compares the pressure spectra of cataloged dust devil events
//! recorded by a stationary surface barometer against quiet-time baselines.
//! Its core is the spectral residual-and-ratio pipeline:
//!
//! ```text
//! PressureSeries ─► AnalysisWindow ─► linear detrend ─► spectrum
//!     ─► log-space smoothing ─► ratio / corrected ratio ─► case aggregate
//! ```
//!
//! ## Key Features
//!
//! - **Shape-preserving smoothing**: moving averages are NaN-padded to the
//!   input length so per-case arrays stay index-aligned across hundreds of
//!   events.
//!
//! - **Explicit spectral kinds**: one transform parameterised by
//!   [`SpectralKind`](spectral::SpectralKind) (power periodogram or
//!   amplitude spectrum).
//!
//! - **Robust aggregation**: truncate-to-shortest or strict-equal-length
//!   policies with NaN-aware reductions.
//!
//! - **Batch isolation**: each case returns a `Result`; failures are
//!   logged and skipped, never aborting a population run.
//!
//! - **Cached catalog**: the event catalog is parsed once and passed by
//!   reference.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dustspec::catalog::{EventCatalog, EventFilter};
//! use dustspec::loader::CsvSolDirectory;
//! use dustspec::pipeline::{CaseId, Pipeline, PipelineConfig};
//!
//! let catalog = EventCatalog::from_path("catalog.csv")?;
//! let source = CsvSolDirectory::new("data/pressure");
//!
//! let ids = catalog.select(&EventFilter::PressureDropBelow(-2.0));
//! let cases: Vec<CaseId> = ids.into_iter().map(CaseId::Event).collect();
//!
//! let pipeline = Pipeline::new(Some(&catalog), &source, PipelineConfig::default());
//! let outcome = pipeline.run_batch(&cases)?;
//! for curve in &outcome.curves {
//!     println!("{}: {} bins", curve.name, curve.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Building blocks
//!
//! The stages are plain functions and can be used on their own:
//!
//! ```rust
//! use dustspec::smoothing::smooth;
//! use dustspec::ratio::ratio_trimmed;
//!
//! let freq: Vec<f64> = (0..32).map(|i| i as f64 * 0.01).collect();
//! let power: Vec<f64> = (1..=32).map(|i| 1.0 / i as f64).collect();
//!
//! let (_, smoothed) = smooth(&freq, &power, 5)?;
//! assert_eq!(smoothed.len(), 32);
//!
//! let (f, ratio) = ratio_trimmed(&freq, &power, &smoothed, 5)?;
//! assert_eq!(f.len(), 28);
//! assert_eq!(ratio.len(), 28);
//! # Ok::<(), dustspec::error::AnalysisError>(())
//! ```

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
// Allow some patterns common in scientific code
#![allow(clippy::too_many_arguments)]

pub mod aggregate;
pub mod catalog;
pub mod clock;
pub mod dispersion;
pub mod error;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod ratio;
pub mod series;
pub mod smoothing;
pub mod spectral;
pub mod trend;
pub mod window;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::aggregate::{aggregate, AggregationPolicy, Reduction};
    pub use crate::catalog::{CatalogEntry, CatalogError, EventCatalog, EventFilter};
    pub use crate::dispersion::Atmosphere;
    pub use crate::error::AnalysisError;
    pub use crate::loader::{CsvSolDirectory, LoadError, SolSource};
    pub use crate::output::{BatchSummary, OutputError};
    pub use crate::pipeline::{
        BatchOutcome, BatchReport, CaseId, CaseOutput, Curve, Pipeline, PipelineConfig, PipelineError, Statistic,
        WindowSpec,
    };
    pub use crate::ratio::{filter_frequency_ceiling, moving_average_of_ratio, ratio_padded, ratio_trimmed};
    pub use crate::series::{PressureSample, PressureSeries};
    pub use crate::smoothing::{moving_average, pad_size, smooth};
    pub use crate::spectral::{spectrum, SpectralKind, Spectrum};
    pub use crate::trend::{fit_residual, Detrended};
    pub use crate::window::{resample, select_after, select_before, select_fixed_local_time, AnalysisWindow};
}
