//! Edge-aware moving averages of spectra.
//!
//! The spectral smoother works in log10 space: low-frequency power exceeds
//! high-frequency power by orders of magnitude, so a linear boxcar would
//! flatten the high-frequency structure. Output is NaN-padded to the input
//! length so that per-case arrays stay index-aligned for aggregation.
//!
//! Window sizes must be odd; `pad_size(w) = (w - 1) / 2` entries at each end
//! are NaN. When the input is shorter than the window, every entry is NaN.

use crate::error::AnalysisError;
use crate::spectral::Spectrum;

/// Number of NaN entries at each end of a padded moving average.
pub fn pad_size(window_size: usize) -> usize {
    window_size.saturating_sub(1) / 2
}

/// Reject zero and even window sizes.
pub fn validate_window(window_size: usize) -> Result<(), AnalysisError> {
    if window_size == 0 || window_size % 2 == 0 {
        return Err(AnalysisError::InvalidWindowSize(window_size));
    }
    Ok(())
}

/// Valid-mode convolution with a uniform kernel of length `window_size`.
///
/// Output length is `N - window_size + 1` (empty when `N < window_size`).
/// Non-finite inputs propagate into every window that covers them.
pub fn convolve_valid(values: &[f64], window_size: usize) -> Vec<f64> {
    if window_size == 0 || values.len() < window_size {
        return Vec::new();
    }
    let width = window_size as f64;
    values
        .windows(window_size)
        .map(|w| w.iter().sum::<f64>() / width)
        .collect()
}

/// Place `valid` in the middle of an all-NaN vector of length `len`.
fn pad_with_nan(valid: Vec<f64>, len: usize, pad: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; len];
    if valid.len() + 2 * pad == len {
        out[pad..len - pad].copy_from_slice(&valid);
    }
    out
}

/// Copy of `frequency` with the edge entries replaced by NaN.
fn trimmed_frequency(frequency: &[f64], window_size: usize) -> Vec<f64> {
    let n = frequency.len();
    let pad = pad_size(window_size);
    if n < window_size {
        return vec![f64::NAN; n];
    }
    pad_with_nan(frequency[pad..n - pad].to_vec(), n, pad)
}

/// Linear moving average, NaN-padded to the input length.
pub fn moving_average(values: &[f64], window_size: usize) -> Result<Vec<f64>, AnalysisError> {
    validate_window(window_size)?;
    Ok(pad_with_nan(convolve_valid(values, window_size), values.len(), pad_size(window_size)))
}

/// Linear moving average in valid mode (shortened by `window_size - 1`).
pub fn moving_average_valid(values: &[f64], window_size: usize) -> Result<Vec<f64>, AnalysisError> {
    validate_window(window_size)?;
    Ok(convolve_valid(values, window_size))
}

/// Log-space moving average of a spectrum.
///
/// Returns `(frequency', magnitude')`, both of the input length: the central
/// entries hold the original frequencies and `10^(mean(log10(m)))`, the
/// outer `pad_size` entries at each end are NaN. A zero magnitude enters as
/// `-inf` and yields 0 for every window that covers it.
pub fn smooth(frequency: &[f64], magnitude: &[f64], window_size: usize) -> Result<(Vec<f64>, Vec<f64>), AnalysisError> {
    validate_window(window_size)?;
    if frequency.len() != magnitude.len() {
        return Err(AnalysisError::ShapeMismatch {
            expected: frequency.len(),
            found: magnitude.len(),
            index: 1,
        });
    }
    let logs: Vec<f64> = magnitude.iter().map(|m| m.log10()).collect();
    let averaged: Vec<f64> = convolve_valid(&logs, window_size)
        .into_iter()
        .map(|l| 10f64.powf(l))
        .collect();
    let magnitude = pad_with_nan(averaged, magnitude.len(), pad_size(window_size));
    Ok((trimmed_frequency(frequency, window_size), magnitude))
}

/// [`smooth`] applied to a [`Spectrum`], keeping its kind.
pub fn smooth_spectrum(spectrum: &Spectrum, window_size: usize) -> Result<Spectrum, AnalysisError> {
    let (frequency, magnitude) = smooth(&spectrum.frequency, &spectrum.magnitude, window_size)?;
    Ok(Spectrum {
        frequency,
        magnitude,
        kind: spectrum.kind,
    })
}

/// Linear valid-mode moving average over both axes of a spectrum.
///
/// The older, shortened smoothing: frequencies are averaged with the same
/// kernel so both outputs have length `N - window_size + 1`.
pub fn smooth_linear_valid(spectrum: &Spectrum, window_size: usize) -> Result<Spectrum, AnalysisError> {
    Ok(Spectrum {
        frequency: moving_average_valid(&spectrum.frequency, window_size)?,
        magnitude: moving_average_valid(&spectrum.magnitude, window_size)?,
        kind: spectrum.kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectral::SpectralKind;

    fn nan_count(values: &[f64]) -> usize {
        values.iter().filter(|v| v.is_nan()).count()
    }

    #[test]
    fn test_pad_size() {
        assert_eq!(pad_size(1), 0);
        assert_eq!(pad_size(3), 1);
        assert_eq!(pad_size(11), 5);
    }

    #[test]
    fn test_even_and_zero_windows_rejected() {
        let x = [1.0; 10];
        assert_eq!(smooth(&x, &x, 4).unwrap_err(), AnalysisError::InvalidWindowSize(4));
        assert_eq!(moving_average(&x, 0).unwrap_err(), AnalysisError::InvalidWindowSize(0));
    }

    #[test]
    fn test_smooth_shape_and_padding() {
        let freq: Vec<f64> = (0..20).map(|i| i as f64 * 0.1).collect();
        let mag: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let (f, m) = smooth(&freq, &mag, 5).unwrap();
        assert_eq!(f.len(), 20);
        assert_eq!(m.len(), 20);
        assert_eq!(nan_count(&m), 4);
        assert_eq!(nan_count(&f), 4);
        assert!(m[..2].iter().all(|v| v.is_nan()));
        assert!(m[18..].iter().all(|v| v.is_nan()));
        assert_eq!(f[2], freq[2]);

        // Geometric mean of 1..=5
        let expected = (1.0f64 * 2.0 * 3.0 * 4.0 * 5.0).powf(0.2);
        assert!((m[2] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_window_one_is_identity() {
        let freq = [0.0, 0.5, 1.0];
        let mag = [4.0, 0.25, 9.0];
        let (f, m) = smooth(&freq, &mag, 1).unwrap();
        assert_eq!(f, freq.to_vec());
        for (a, b) in m.iter().zip(mag) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_short_input_is_all_nan() {
        let x = [1.0, 2.0, 3.0];
        let (f, m) = smooth(&x, &x, 5).unwrap();
        assert_eq!(m.len(), 3);
        assert_eq!(nan_count(&m), 3);
        assert_eq!(nan_count(&f), 3);
    }

    #[test]
    fn test_zero_magnitude_propagates() {
        let freq = [0.0, 1.0, 2.0, 3.0, 4.0];
        let mag = [1.0, 1.0, 0.0, 1.0, 1.0];
        let (_, m) = smooth(&freq, &mag, 3).unwrap();
        assert_eq!(m[1], 0.0);
        assert_eq!(m[2], 0.0);
        assert_eq!(m[3], 0.0);
    }

    #[test]
    fn test_linear_moving_average_variants() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let padded = moving_average(&x, 3).unwrap();
        assert!(padded[0].is_nan() && padded[4].is_nan());
        assert_eq!(&padded[1..4], &[2.0, 3.0, 4.0]);
        assert_eq!(moving_average_valid(&x, 3).unwrap(), vec![2.0, 3.0, 4.0]);

        let spectrum = Spectrum {
            frequency: vec![0.0, 1.0, 2.0, 3.0],
            magnitude: vec![2.0, 4.0, 6.0, 8.0],
            kind: SpectralKind::Power,
        };
        let moved = smooth_linear_valid(&spectrum, 3).unwrap();
        assert_eq!(moved.frequency, vec![1.0, 2.0]);
        assert_eq!(moved.magnitude, vec![4.0, 6.0]);
    }
}
