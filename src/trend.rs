//! Linear trend removal.
//!
//! The slow barometric drift across a window is removed by an ordinary
//! least-squares line in elapsed time; the residual is what goes on to the
//! spectral estimator.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::window::AnalysisWindow;

/// Slope and intercept of a least-squares line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    /// Pa per second
    pub slope: f64,
    /// Pa at elapsed = 0
    pub intercept: f64,
}

impl LinearFit {
    /// Evaluate the line.
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// One row of a detrended window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetrendedSample {
    /// Seconds on the window's elapsed axis
    pub elapsed: f64,
    /// Observed pressure
    pub pressure: f64,
    /// Pressure predicted by the fitted line
    pub predicted: f64,
    /// `pressure - predicted`
    pub residual: f64,
}

/// A window with its linear trend removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detrended {
    /// Rows that entered the fit, in window order
    pub samples: Vec<DetrendedSample>,
    /// The fitted line
    pub fit: LinearFit,
}

impl Detrended {
    /// Elapsed axis of the retained rows.
    pub fn elapsed(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.elapsed).collect()
    }

    /// Residual series.
    pub fn residuals(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.residual).collect()
    }

    /// Number of retained rows.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no rows were retained.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Ordinary least-squares line through `(x, y)`.
///
/// Both slices must be finite and of equal length, with at least two
/// distinct `x` values.
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LinearFit, AnalysisError> {
    if x.len() != y.len() {
        return Err(AnalysisError::ShapeMismatch {
            expected: x.len(),
            found: y.len(),
            index: 1,
        });
    }
    if x.len() < 2 {
        return Err(AnalysisError::insufficient(2, x.len()));
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (sxx, sxy) = x.iter().zip(y).fold((0.0, 0.0), |(sxx, sxy), (&xi, &yi)| {
        let dx = xi - mean_x;
        (sxx + dx * dx, sxy + dx * (yi - mean_y))
    });

    if sxx == 0.0 {
        return Err(AnalysisError::insufficient(2, 1));
    }

    let slope = sxy / sxx;
    Ok(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Fit a line to the window's pressure over elapsed time and return the
/// residual series.
///
/// Rows with a non-finite pressure (missing readings, empty resample
/// buckets) are dropped before fitting.
pub fn fit_residual(window: &AnalysisWindow) -> Result<Detrended, AnalysisError> {
    let (x, y): (Vec<f64>, Vec<f64>) = window
        .samples()
        .iter()
        .filter(|s| s.pressure.is_finite() && s.elapsed.is_finite())
        .map(|s| (s.elapsed, s.pressure))
        .unzip();

    let fit = fit_line(&x, &y)?;

    let samples = x
        .iter()
        .zip(&y)
        .map(|(&elapsed, &pressure)| {
            let predicted = fit.predict(elapsed);
            DetrendedSample {
                elapsed,
                pressure,
                predicted,
                residual: pressure - predicted,
            }
        })
        .collect();

    Ok(Detrended { samples, fit })
}
