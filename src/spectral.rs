//! One-sided spectra of residual series.
//!
//! A single transform parameterised by [`SpectralKind`]:
//!
//! - [`SpectralKind::Power`]: periodogram with constant detrend, boxcar
//!   window and density scaling `|X|^2 / (fs * N)`. Bins run from DC to
//!   `fs/2` (`N/2 + 1` of them); every bin except DC and, for even `N`, the
//!   Nyquist bin is doubled so total power is preserved.
//! - [`SpectralKind::Amplitude`]: forward-normalised FFT `|X| / N` over the
//!   first `N/2` bins, doubled. For odd `N` the DC bin is halved back.
//!
//! The sampling frequency is estimated from the elapsed axis as
//! `1 / mean(diff(elapsed))` and is not assumed constant. Large gaps bias
//! it; resample the window first when that matters.

use log::debug;
use rustfft::{num_complex::Complex64, FftPlanner};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::trend::Detrended;

/// Which magnitude a spectrum carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectralKind {
    /// Power spectral density (Pa^2/Hz)
    #[default]
    Power,
    /// Single-sided amplitude (Pa)
    Amplitude,
}

impl SpectralKind {
    /// Short label used in file names and reports.
    pub fn label(&self) -> &'static str {
        match self {
            SpectralKind::Power => "power",
            SpectralKind::Amplitude => "amplitude",
        }
    }
}

impl std::fmt::Display for SpectralKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Frequency bins and magnitudes of equal length.
///
/// Frequencies are ascending from 0 with spacing `fs / N`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    /// Frequency bins (Hz)
    pub frequency: Vec<f64>,
    /// Magnitude per bin
    pub magnitude: Vec<f64>,
    /// Estimator that produced the magnitudes
    pub kind: SpectralKind,
}

impl Spectrum {
    /// Number of bins.
    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    /// Whether the spectrum has no bins.
    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    /// Index and frequency of the largest finite magnitude, skipping DC.
    pub fn peak(&self) -> Option<(usize, f64)> {
        self.magnitude
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, m)| m.is_finite())
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| (i, self.frequency[i]))
    }
}

/// Estimate the sampling frequency from an elapsed-time axis.
pub fn sampling_frequency(elapsed: &[f64]) -> Result<f64, AnalysisError> {
    if elapsed.len() < 2 {
        return Err(AnalysisError::insufficient(2, elapsed.len()));
    }
    let span = elapsed[elapsed.len() - 1] - elapsed[0];
    let mean_step = span / (elapsed.len() - 1) as f64;
    if !(mean_step.is_finite() && mean_step > 0.0) {
        return Err(AnalysisError::InvalidParameter(format!(
            "elapsed axis must increase, mean step is {}",
            mean_step
        )));
    }
    Ok(1.0 / mean_step)
}

/// Spectrum of a detrended window's residuals.
pub fn spectrum(detrended: &Detrended, kind: SpectralKind) -> Result<Spectrum, AnalysisError> {
    spectrum_of(&detrended.elapsed(), &detrended.residuals(), kind)
}

/// Spectrum of `values` sampled on `elapsed`.
pub fn spectrum_of(elapsed: &[f64], values: &[f64], kind: SpectralKind) -> Result<Spectrum, AnalysisError> {
    if values.len() < 2 {
        return Err(AnalysisError::insufficient(2, values.len()));
    }
    if elapsed.len() != values.len() {
        return Err(AnalysisError::ShapeMismatch {
            expected: elapsed.len(),
            found: values.len(),
            index: 1,
        });
    }
    let fs = sampling_frequency(elapsed)?;
    let (frequency, magnitude) = match kind {
        SpectralKind::Power => periodogram(values, fs),
        SpectralKind::Amplitude => amplitude_spectrum(values, fs),
    };
    debug!("{} spectrum: N={} fs={:.4} Hz, {} bins", kind, values.len(), fs, frequency.len());
    Ok(Spectrum {
        frequency,
        magnitude,
        kind,
    })
}

fn forward_fft(values: &[f64]) -> Vec<Complex64> {
    let mut buffer: Vec<Complex64> = values.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);
    buffer
}

fn bin_frequencies(n_bins: usize, n: usize, fs: f64) -> Vec<f64> {
    (0..n_bins).map(|k| k as f64 * fs / n as f64).collect()
}

fn periodogram(values: &[f64], fs: f64) -> (Vec<f64>, Vec<f64>) {
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let centred: Vec<f64> = values.iter().map(|v| v - mean).collect();
    let spectrum = forward_fft(&centred);

    let n_bins = n / 2 + 1;
    let scale = 1.0 / (fs * n as f64);
    let mut power: Vec<f64> = spectrum[..n_bins].iter().map(|c| c.norm_sqr() * scale).collect();
    let doubled_end = if n % 2 == 0 { n_bins - 1 } else { n_bins };
    for p in &mut power[1..doubled_end] {
        *p *= 2.0;
    }
    (bin_frequencies(n_bins, n, fs), power)
}

fn amplitude_spectrum(values: &[f64], fs: f64) -> (Vec<f64>, Vec<f64>) {
    let n = values.len();
    let spectrum = forward_fft(values);

    let n_bins = n / 2;
    let mut amplitude: Vec<f64> = spectrum[..n_bins].iter().map(|c| 2.0 * c.norm() / n as f64).collect();
    if n % 2 == 1 {
        if let Some(dc) = amplitude.first_mut() {
            *dc /= 2.0;
        }
    }
    (bin_frequencies(n_bins, n, fs), amplitude)
}
