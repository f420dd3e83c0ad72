//! Pipeline presets for common analyses.
//!
//! Presets bundle a window mode, statistic, spectrum kind and resample
//! cadence so the usual comparisons need a single flag.

use std::fmt;

use dustspec::pipeline::{PipelineConfig, Statistic, WindowSpec};
use dustspec::spectral::SpectralKind;

/// Named analysis setups.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Preset {
    /// Power ratio in the window leading up to the event (default).
    ///
    /// - Window: before, 600 s, 20 s lag
    /// - Statistic: ratio
    /// - No resampling
    #[default]
    Near,

    /// Corrected ratio before the event on a 0.5 s grid.
    ///
    /// - Window: before, 600 s, 20 s lag
    /// - Statistic: corrected ratio
    /// - Resample: 0.5 s
    NearMoving,

    /// Corrected ratio after the pressure has returned to baseline.
    ///
    /// - Window: after, 600 s, 20 s lag
    /// - Statistic: corrected ratio
    /// - Resample: 0.5 s
    ReturnAfter,

    /// Amplitude spectrum before the event on a 0.5 s grid.
    ///
    /// - Window: before, 600 s, 20 s lag
    /// - Statistic: spectrum (amplitude)
    /// - Resample: 0.5 s
    NearAmplitude,
}

impl Preset {
    /// Window for this preset.
    pub fn window(&self) -> WindowSpec {
        match self {
            Preset::ReturnAfter => WindowSpec::After {
                duration: 600.0,
                offset: 20.0,
            },
            _ => WindowSpec::default(),
        }
    }

    /// Statistic for this preset.
    pub fn statistic(&self) -> Statistic {
        match self {
            Preset::Near => Statistic::Ratio,
            Preset::NearMoving | Preset::ReturnAfter => Statistic::CorrectedRatio,
            Preset::NearAmplitude => Statistic::Spectrum,
        }
    }

    /// Spectrum kind for this preset.
    pub fn kind(&self) -> SpectralKind {
        match self {
            Preset::NearAmplitude => SpectralKind::Amplitude,
            _ => SpectralKind::Power,
        }
    }

    /// Resample cadence for this preset.
    pub fn resample(&self) -> Option<f64> {
        match self {
            Preset::Near => None,
            _ => Some(0.5),
        }
    }

    /// Full pipeline configuration for this preset.
    pub fn config(&self) -> PipelineConfig {
        PipelineConfig {
            window: self.window(),
            statistic: self.statistic(),
            kind: self.kind(),
            resample: self.resample(),
            ..Default::default()
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Near => write!(f, "near"),
            Preset::NearMoving => write!(f, "near-moving"),
            Preset::ReturnAfter => write!(f, "return-after"),
            Preset::NearAmplitude => write!(f, "near-amplitude"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_defaults() {
        let near = Preset::default();
        assert_eq!(near, Preset::Near);
        assert_eq!(near.config(), PipelineConfig::default());
    }

    #[test]
    fn test_return_after_preset() {
        let config = Preset::ReturnAfter.config();
        assert_eq!(config.window, WindowSpec::After { duration: 600.0, offset: 20.0 });
        assert_eq!(config.statistic, Statistic::CorrectedRatio);
        assert_eq!(config.resample, Some(0.5));
        assert!(config.validate().is_ok());
        assert_eq!(Preset::NearAmplitude.to_string(), "near-amplitude");
    }
}
