use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::ratio::{filter_frequency_ceiling, moving_average_of_ratio, ratio_padded, ratio_trimmed};
use crate::smoothing::{smooth, smooth_linear_valid};
use crate::spectral::Spectrum;

/// Which derived curves a case produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    /// The raw spectrum (`spectrum`)
    Spectrum,
    /// Spectrum plus its log-space NaN-padded moving average (`spectrum`, `smoothed`)
    Smoothed,
    /// Trimmed ratio of spectrum to its smoothed version (`ratio`)
    #[default]
    Ratio,
    /// Padded ratio re-smoothed linearly with the ratio window (`corrected_ratio`)
    CorrectedRatio,
    /// Spectrum plus a plain linear valid-mode moving average (`spectrum`, `moving`)
    SmoothedLinear,
}

impl Statistic {
    /// Short label used in directory names and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Statistic::Spectrum => "spectrum",
            Statistic::Smoothed => "smoothed",
            Statistic::Ratio => "ratio",
            Statistic::CorrectedRatio => "corrected_ratio",
            Statistic::SmoothedLinear => "moving",
        }
    }

    /// Derive this statistic's curves from a spectrum.
    pub fn curves(&self, spectrum: &Spectrum, smoothing_window: usize, ratio_window: usize) -> Result<Vec<Curve>, AnalysisError> {
        let raw = || Curve::new("spectrum", spectrum.frequency.clone(), spectrum.magnitude.clone());
        let curves = match self {
            Statistic::Spectrum => vec![raw()],
            Statistic::Smoothed => {
                let (frequency, magnitude) = smooth(&spectrum.frequency, &spectrum.magnitude, smoothing_window)?;
                vec![raw(), Curve::new("smoothed", frequency, magnitude)]
            }
            Statistic::Ratio => {
                let (_, smoothed) = smooth(&spectrum.frequency, &spectrum.magnitude, smoothing_window)?;
                let (frequency, ratio) = ratio_trimmed(&spectrum.frequency, &spectrum.magnitude, &smoothed, smoothing_window)?;
                vec![Curve::new("ratio", frequency, ratio)]
            }
            Statistic::CorrectedRatio => {
                let (smoothed_frequency, smoothed) = smooth(&spectrum.frequency, &spectrum.magnitude, smoothing_window)?;
                let (_, ratio) = ratio_padded(&spectrum.frequency, &spectrum.magnitude, &smoothed)?;
                let (frequency, corrected) = moving_average_of_ratio(&smoothed_frequency, &ratio, ratio_window)?;
                vec![Curve::new("corrected_ratio", frequency, corrected)]
            }
            Statistic::SmoothedLinear => {
                let moved = smooth_linear_valid(spectrum, smoothing_window)?;
                vec![raw(), Curve::new("moving", moved.frequency, moved.magnitude)]
            }
        };
        Ok(curves)
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where the analysis window sits relative to the case's reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WindowSpec {
    /// `(t - offset - duration, t - offset)`
    Before {
        /// Window length (s)
        duration: f64,
        /// Gap between window end and event (s)
        offset: f64,
    },
    /// `(t + offset, t + offset + duration)`
    After {
        /// Window length (s)
        duration: f64,
        /// Gap between event and window start (s)
        offset: f64,
    },
    /// `(t - duration, t)`
    OnEvent {
        /// Window length (s)
        duration: f64,
    },
    /// `(hour:00, hour:00 + duration)` on the case's sol
    FixedLocalTime {
        /// Local hour of day
        hour: u32,
        /// Window length (s)
        duration: f64,
    },
}

impl Default for WindowSpec {
    fn default() -> Self {
        WindowSpec::Before {
            duration: 600.0,
            offset: 20.0,
        }
    }
}

impl WindowSpec {
    /// Window length in seconds.
    pub fn duration(&self) -> f64 {
        match *self {
            WindowSpec::Before { duration, .. }
            | WindowSpec::After { duration, .. }
            | WindowSpec::OnEvent { duration }
            | WindowSpec::FixedLocalTime { duration, .. } => duration,
        }
    }

    /// Offset from the reference, where the mode has one.
    pub fn offset(&self) -> Option<f64> {
        match *self {
            WindowSpec::Before { offset, .. } | WindowSpec::After { offset, .. } => Some(offset),
            _ => None,
        }
    }

    /// Same mode with a new duration.
    pub fn with_duration(self, new_duration: f64) -> Self {
        match self {
            WindowSpec::Before { offset, .. } => WindowSpec::Before {
                duration: new_duration,
                offset,
            },
            WindowSpec::After { offset, .. } => WindowSpec::After {
                duration: new_duration,
                offset,
            },
            WindowSpec::OnEvent { .. } => WindowSpec::OnEvent { duration: new_duration },
            WindowSpec::FixedLocalTime { hour, .. } => WindowSpec::FixedLocalTime {
                hour,
                duration: new_duration,
            },
        }
    }

    /// Same mode with a new offset; modes without an offset are unchanged.
    pub fn with_offset(self, new_offset: f64) -> Self {
        match self {
            WindowSpec::Before { duration, .. } => WindowSpec::Before {
                duration,
                offset: new_offset,
            },
            WindowSpec::After { duration, .. } => WindowSpec::After {
                duration,
                offset: new_offset,
            },
            other => other,
        }
    }

    /// Short label used in directory names (`before`, `after`, `on`, `fixed14h`).
    pub fn label(&self) -> String {
        match self {
            WindowSpec::Before { .. } => "before".to_string(),
            WindowSpec::After { .. } => "after".to_string(),
            WindowSpec::OnEvent { .. } => "on".to_string(),
            WindowSpec::FixedLocalTime { hour, .. } => format!("fixed{:02}h", hour),
        }
    }
}

/// One unit of work in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseId {
    /// A cataloged event, windowed around its local time
    Event(u32),
    /// An eventless sol, windowed at a fixed local hour
    QuietSol {
        /// Sol to analyse
        sol: u32,
        /// Local hour the window starts at
        hour: u32,
    },
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseId::Event(id) => write!(f, "ID {}", id),
            CaseId::QuietSol { sol, hour } => write!(f, "sol {} {:02}h", sol, hour),
        }
    }
}

/// A named `(frequency, value)` array pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    /// Curve name (`spectrum`, `smoothed`, `ratio`, `corrected_ratio`, `moving`)
    pub name: String,
    /// Frequency axis (Hz), possibly NaN-padded
    pub frequency: Vec<f64>,
    /// Values, possibly NaN-padded
    pub values: Vec<f64>,
}

impl Curve {
    /// Create a curve.
    pub fn new(name: impl Into<String>, frequency: Vec<f64>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            frequency,
            values,
        }
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the curve has no bins.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// NaN out every bin at or above `threshold` Hz.
    pub fn apply_ceiling(&mut self, threshold: f64) {
        filter_frequency_ceiling(&mut self.frequency, &mut self.values, threshold);
    }
}

/// Everything one case produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseOutput {
    /// The case
    pub case: CaseId,
    /// Sol the window was taken from
    pub sol: u32,
    /// Derived curves
    pub curves: Vec<Curve>,
    /// Acoustic/gravity-wave border frequency (Hz) for labelling
    pub border_frequency: f64,
}

impl CaseOutput {
    /// Find a curve by name.
    pub fn curve(&self, name: &str) -> Option<&Curve> {
        self.curves.iter().find(|c| c.name == name)
    }
}
