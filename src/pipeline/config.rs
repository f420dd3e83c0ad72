use serde::{Deserialize, Serialize};

use super::types::{Statistic, WindowSpec};
use crate::aggregate::{AggregationPolicy, Reduction};
use crate::error::AnalysisError;
use crate::smoothing::validate_window;
use crate::spectral::SpectralKind;
use crate::window::{check_cadence, MAX_RESAMPLE_BUCKETS};

/// Parameters of a case or batch run.
///
/// Deserializes from a partial TOML table; missing keys take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Window placement and length
    pub window: WindowSpec,
    /// Resample cadence in seconds (None = use samples as recorded)
    pub resample: Option<f64>,
    /// Power or amplitude spectrum
    pub kind: SpectralKind,
    /// Curves to derive per case
    pub statistic: Statistic,
    /// Log-space smoothing window (odd)
    pub smoothing_window: usize,
    /// Window for re-smoothing ratios (odd)
    pub ratio_window: usize,
    /// Drop bins at or above this frequency (Hz)
    pub frequency_ceiling: Option<f64>,
    /// How ragged per-case arrays are combined
    pub policy: AggregationPolicy,
    /// Reduction across cases
    pub reduction: Reduction,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window: WindowSpec::default(),
            resample: None,
            kind: SpectralKind::Power,
            statistic: Statistic::Ratio,
            smoothing_window: 11,
            ratio_window: 11,
            frequency_ceiling: None,
            policy: AggregationPolicy::TruncateToShortest,
            reduction: Reduction::NanMean,
        }
    }
}

impl PipelineConfig {
    /// Check parameter domains before any case runs.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        validate_window(self.smoothing_window)?;
        validate_window(self.ratio_window)?;

        let duration = self.window.duration();
        if !(duration.is_finite() && duration > 0.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "window duration must be positive, got {}",
                duration
            )));
        }
        if let Some(offset) = self.window.offset() {
            if !offset.is_finite() {
                return Err(AnalysisError::InvalidParameter(format!("window offset must be finite, got {}", offset)));
            }
        }
        if let WindowSpec::FixedLocalTime { hour, .. } = self.window {
            if hour > 23 {
                return Err(AnalysisError::InvalidParameter(format!("hour must be 0..=23, got {}", hour)));
            }
        }
        if let Some(cadence) = self.resample {
            check_cadence(cadence)?;
            if duration / cadence > MAX_RESAMPLE_BUCKETS as f64 {
                return Err(AnalysisError::InvalidParameter(format!(
                    "a {}s window at {}s cadence exceeds {} buckets",
                    duration, cadence, MAX_RESAMPLE_BUCKETS
                )));
            }
        }
        if let Some(ceiling) = self.frequency_ceiling {
            if ceiling.is_nan() {
                return Err(AnalysisError::InvalidParameter("frequency ceiling is NaN".to_string()));
            }
        }
        Ok(())
    }
}
