use log::debug;

use super::config::PipelineConfig;
use super::error::PipelineError;
use super::types::{CaseId, CaseOutput, WindowSpec};
use crate::catalog::EventCatalog;
use crate::dispersion::Atmosphere;
use crate::error::AnalysisError;
use crate::loader::{load_surrounding, SolSource};
use crate::spectral::spectrum;
use crate::trend::fit_residual;
use crate::window::{resample, select_after, select_before, select_fixed_local_time, select_on_event, AnalysisWindow};

/// Runs cases against a catalog and a pressure source.
///
/// Holds only borrowed, read-only state, so one pipeline can serve many
/// cases concurrently.
pub struct Pipeline<'a> {
    catalog: Option<&'a EventCatalog>,
    source: &'a dyn SolSource,
    config: PipelineConfig,
    atmosphere: Atmosphere,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline. `catalog` may be `None` when only quiet-sol cases
    /// will be run.
    pub fn new(catalog: Option<&'a EventCatalog>, source: &'a dyn SolSource, config: PipelineConfig) -> Self {
        Self {
            catalog,
            source,
            config,
            atmosphere: Atmosphere::default(),
        }
    }

    /// Replace the atmosphere used for the border frequency.
    pub fn with_atmosphere(mut self, atmosphere: Atmosphere) -> Self {
        self.atmosphere = atmosphere;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Border frequency reported with every case.
    pub fn border_frequency(&self) -> f64 {
        self.atmosphere.border_frequency()
    }

    fn select_window(&self, case: CaseId) -> Result<(u32, AnalysisWindow), PipelineError> {
        match case {
            CaseId::Event(id) => {
                let catalog = self.catalog.ok_or(PipelineError::NoCatalog)?;
                let (sol, reference) = catalog.lookup(id)?;
                let series = load_surrounding(self.source, sol)?;
                let window = match self.config.window {
                    WindowSpec::Before { duration, offset } => select_before(&series, reference, duration, offset),
                    WindowSpec::After { duration, offset } => select_after(&series, reference, duration, offset),
                    WindowSpec::OnEvent { duration } => select_on_event(&series, reference, duration),
                    WindowSpec::FixedLocalTime { hour, duration } => select_fixed_local_time(&series, sol, hour, duration)?,
                };
                Ok((sol, window))
            }
            CaseId::QuietSol { sol, hour } => {
                let series = load_surrounding(self.source, sol)?;
                let window = select_fixed_local_time(&series, sol, hour, self.config.window.duration())?;
                Ok((sol, window))
            }
        }
    }

    /// Run one case through window selection, detrending, spectral
    /// estimation and the configured statistic.
    pub fn run_case(&self, case: CaseId) -> Result<CaseOutput, PipelineError> {
        let (sol, window) = self.select_window(case)?;
        if window.is_empty() {
            return Err(AnalysisError::NoData(format!("{} (sol {}): no samples in the {} window", case, sol, self.config.window.label())).into());
        }

        let window = match self.config.resample {
            Some(cadence) => resample(&window, cadence)?,
            None => window,
        };

        let detrended = fit_residual(&window)?;
        let spectrum = spectrum(&detrended, self.config.kind)?;
        let mut curves = self
            .config
            .statistic
            .curves(&spectrum, self.config.smoothing_window, self.config.ratio_window)?;

        if let Some(ceiling) = self.config.frequency_ceiling {
            for curve in &mut curves {
                curve.apply_ceiling(ceiling);
            }
        }

        debug!(
            "{} (sol {}): {} samples, slope {:.3e} Pa/s, {} bins",
            case,
            sol,
            detrended.len(),
            detrended.fit.slope,
            spectrum.len()
        );

        Ok(CaseOutput {
            case,
            sol,
            curves,
            border_frequency: self.border_frequency(),
        })
    }
}
