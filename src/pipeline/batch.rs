use std::time::Instant;

use log::{info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use super::case::Pipeline;
use super::error::PipelineError;
use super::report::{BatchReport, CaseRecord};
use super::types::{CaseId, CaseOutput, Curve};
use crate::aggregate::aggregate_paired;

/// Result of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    /// Per-case ledger
    pub report: BatchReport,
    /// Outputs of the contributing cases, in input order
    pub cases: Vec<CaseOutput>,
    /// Population curves, one per curve name
    pub curves: Vec<Curve>,
    /// Border frequency (Hz)
    pub border_frequency: f64,
    /// Wall-clock seconds spent
    pub elapsed_seconds: f64,
}

impl<'a> Pipeline<'a> {
    /// Run every case and aggregate the survivors.
    pub fn run_batch(&self, cases: &[CaseId]) -> Result<BatchOutcome, PipelineError> {
        self.run_batch_titled("batch", cases)
    }

    /// [`Pipeline::run_batch`] with a title for the report.
    pub fn run_batch_titled(&self, title: &str, cases: &[CaseId]) -> Result<BatchOutcome, PipelineError> {
        self.config().validate()?;
        let start_time = Instant::now();
        info!("Running {} cases ({}, {} window)", cases.len(), self.config().statistic, self.config().window.label());

        #[cfg(feature = "parallel")]
        let results: Vec<(CaseId, Result<CaseOutput, PipelineError>)> =
            cases.par_iter().map(|&case| (case, self.run_case(case))).collect();

        #[cfg(not(feature = "parallel"))]
        let results: Vec<(CaseId, Result<CaseOutput, PipelineError>)> =
            cases.iter().map(|&case| (case, self.run_case(case))).collect();

        let mut report = BatchReport::new(title);
        let mut outputs = Vec::new();
        for (case, result) in results {
            match result {
                Ok(output) => {
                    report.add_record(CaseRecord::ok(case, output.sol));
                    outputs.push(output);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", case, e);
                    report.add_record(CaseRecord::skipped(case, e.to_string()));
                }
            }
        }

        if outputs.is_empty() {
            return Err(PipelineError::NoCases(format!("all {} cases of '{}' were skipped", cases.len(), title)));
        }

        let curves = self.aggregate_curves(&outputs)?;
        let elapsed_seconds = start_time.elapsed().as_secs_f64();
        info!(
            "Aggregated {} of {} cases into {} curves in {:.2}s",
            outputs.len(),
            cases.len(),
            curves.len(),
            elapsed_seconds
        );

        Ok(BatchOutcome {
            report,
            cases: outputs,
            curves,
            border_frequency: self.border_frequency(),
            elapsed_seconds,
        })
    }

    /// Aggregate curves by name. Each case's frequency axis follows its values
    /// through the survivor filter.
    fn aggregate_curves(&self, outputs: &[CaseOutput]) -> Result<Vec<Curve>, PipelineError> {
        let mut names: Vec<&str> = Vec::new();
        for curve in outputs.iter().flat_map(|o| &o.curves) {
            if !names.contains(&curve.name.as_str()) {
                names.push(&curve.name);
            }
        }

        let config = self.config();
        names
            .into_iter()
            .map(|name| {
                let members: Vec<&Curve> = outputs.iter().filter_map(|o| o.curve(name)).collect();
                let frequencies: Vec<&[f64]> = members.iter().map(|c| c.frequency.as_slice()).collect();
                let values: Vec<&[f64]> = members.iter().map(|c| c.values.as_slice()).collect();

                let (frequency, values) = aggregate_paired(&frequencies, &values, config.policy, config.reduction)?;
                if values.is_empty() {
                    return Err(PipelineError::NoCases(format!("curve '{}' has no usable bins in any case", name)));
                }
                Ok(Curve::new(name, frequency, values))
            })
            .collect()
    }
}
