//! # Case Pipeline
//!
//! Wires the analytical stages into per-case and population runs:
//!
//! ```text
//! catalog lookup ─► load sols ─► select window ─► [resample] ─► detrend
//!     ─► spectrum ─► statistic curves ─► [frequency ceiling]
//! ```
//!
//! - [`Pipeline::run_case`] processes one [`CaseId`] and returns its
//!   [`CaseOutput`].
//! - [`Pipeline::run_batch`] maps every case independently, records what
//!   was skipped in a [`BatchReport`], and aggregates the surviving curves
//!   by name with the configured [`AggregationPolicy`](crate::aggregate::AggregationPolicy).
//!
//! A failing case never aborts a batch. A batch with zero contributing
//! cases is an error ([`PipelineError::NoCases`]).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dustspec::catalog::EventCatalog;
//! use dustspec::loader::CsvSolDirectory;
//! use dustspec::pipeline::{CaseId, Pipeline, PipelineConfig};
//!
//! let catalog = EventCatalog::from_path("catalog.csv")?;
//! let source = CsvSolDirectory::new("data");
//! let pipeline = Pipeline::new(Some(&catalog), &source, PipelineConfig::default());
//!
//! let outcome = pipeline.run_batch(&[CaseId::Event(42), CaseId::Event(43)])?;
//! println!("{}", outcome.report);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod batch;
mod case;
mod config;
mod error;
mod report;
mod types;


pub use batch::BatchOutcome;
pub use case::Pipeline;
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use report::{BatchReport, CaseRecord, CaseStatus};
pub use types::{CaseId, CaseOutput, Curve, Statistic, WindowSpec};
