//! Spectrum-to-smoothed-spectrum ratios.
//!
//! Two compositions exist and are kept apart by name:
//! [`ratio_trimmed`] drops the smoother's padded edges before dividing,
//! [`ratio_padded`] divides at full length and keeps the NaN edges so the
//! result stays index-aligned with other padded arrays.

use crate::error::AnalysisError;
use crate::smoothing::{moving_average, pad_size, validate_window};

fn check_lengths(expected: usize, others: &[usize]) -> Result<(), AnalysisError> {
    for (i, &len) in others.iter().enumerate() {
        if len != expected {
            return Err(AnalysisError::ShapeMismatch {
                expected,
                found: len,
                index: i + 1,
            });
        }
    }
    Ok(())
}

/// Divide `magnitude` by `smoothed` after trimming `pad_size(window_size)`
/// entries from both ends of all three arrays.
///
/// Output length is `N - 2 * pad_size`, or empty when the input is too
/// short to keep anything.
pub fn ratio_trimmed(
    frequency: &[f64],
    magnitude: &[f64],
    smoothed: &[f64],
    window_size: usize,
) -> Result<(Vec<f64>, Vec<f64>), AnalysisError> {
    validate_window(window_size)?;
    let n = frequency.len();
    check_lengths(n, &[magnitude.len(), smoothed.len()])?;

    let pad = pad_size(window_size);
    if n <= 2 * pad {
        return Ok((Vec::new(), Vec::new()));
    }
    let range = pad..n - pad;
    let ratio = magnitude[range.clone()]
        .iter()
        .zip(&smoothed[range.clone()])
        .map(|(m, s)| m / s)
        .collect();
    Ok((frequency[range].to_vec(), ratio))
}

/// Elementwise `magnitude / smoothed` at full length.
///
/// NaN entries of `smoothed` give NaN ratios; `frequency` is returned as is.
pub fn ratio_padded(frequency: &[f64], magnitude: &[f64], smoothed: &[f64]) -> Result<(Vec<f64>, Vec<f64>), AnalysisError> {
    check_lengths(frequency.len(), &[magnitude.len(), smoothed.len()])?;
    let ratio = magnitude.iter().zip(smoothed).map(|(m, s)| m / s).collect();
    Ok((frequency.to_vec(), ratio))
}

/// Linear NaN-padded moving average over a ratio and its frequency axis
/// (the "corrected" spectrum).
pub fn moving_average_of_ratio(
    frequency: &[f64],
    ratio: &[f64],
    window_size: usize,
) -> Result<(Vec<f64>, Vec<f64>), AnalysisError> {
    check_lengths(frequency.len(), &[ratio.len()])?;
    Ok((moving_average(frequency, window_size)?, moving_average(ratio, window_size)?))
}

/// Set `x[i]` and `y[i]` to NaN wherever `x[i] >= threshold`.
pub fn filter_frequency_ceiling(x: &mut [f64], y: &mut [f64], threshold: f64) {
    for (xi, yi) in x.iter_mut().zip(y.iter_mut()) {
        if *xi >= threshold {
            *xi = f64::NAN;
            *yi = f64::NAN;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smoothing::smooth;

    #[test]
    fn test_ratio_of_spectrum_with_itself_is_one() {
        let freq: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let mag = [0.0, 2.0, 3.0, 0.5, 7.0, 1.0, 1e-6, 4.0, 9.0, 2.0];
        let (_, ratio) = ratio_padded(&freq, &mag, &mag).unwrap();
        for (r, m) in ratio.iter().zip(mag) {
            if m != 0.0 {
                assert_eq!(*r, 1.0);
            } else {
                assert!(r.is_nan());
            }
        }
    }

    #[test]
    fn test_trimmed_ratio_drops_edges() {
        let freq: Vec<f64> = (0..12).map(|i| i as f64 * 0.25).collect();
        let mag: Vec<f64> = (1..=12).map(|i| i as f64).collect();
        let (_, smoothed) = smooth(&freq, &mag, 5).unwrap();
        let (f, r) = ratio_trimmed(&freq, &mag, &smoothed, 5).unwrap();
        assert_eq!(f.len(), 8);
        assert_eq!(f[0], 0.5);
        assert!(r.iter().all(|v| v.is_finite()));

        let (f, r) = ratio_trimmed(&freq[..4], &mag[..4], &smoothed[..4], 5).unwrap();
        assert!(f.is_empty() && r.is_empty());
    }

    #[test]
    fn test_padded_ratio_keeps_nan_edges() {
        let freq: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let mag: Vec<f64> = (1..=12).map(|i| i as f64).collect();
        let (_, smoothed) = smooth(&freq, &mag, 3).unwrap();
        let (f, r) = ratio_padded(&freq, &mag, &smoothed).unwrap();
        assert_eq!(f, freq);
        assert_eq!(r.len(), 12);
        assert!(r[0].is_nan() && r[11].is_nan());
        assert!(r[1..11].iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_length_mismatch() {
        let err = ratio_padded(&[1.0, 2.0], &[1.0], &[1.0, 2.0]).unwrap_err();
        assert_eq!(err, AnalysisError::ShapeMismatch { expected: 2, found: 1, index: 1 });
    }

    #[test]
    fn test_moving_average_of_ratio() {
        let freq = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ratio = [1.0, 2.0, 3.0, 2.0, 1.0];
        let (f, r) = moving_average_of_ratio(&freq, &ratio, 3).unwrap();
        assert!(f[0].is_nan() && r[4].is_nan());
        assert_eq!(&f[1..4], &[1.0, 2.0, 3.0]);
        assert_eq!(r[1], 2.0);
        assert!(moving_average_of_ratio(&freq, &ratio, 2).is_err());
    }

    #[test]
    fn test_frequency_ceiling() {
        let mut x = vec![0.1, 0.5, 1.0, 2.0];
        let mut y = vec![10.0, 20.0, 30.0, 40.0];
        filter_frequency_ceiling(&mut x, &mut y, 1.0);
        assert_eq!(&x[..2], &[0.1, 0.5]);
        assert_eq!(&y[..2], &[10.0, 20.0]);
        assert!(x[2].is_nan() && y[2].is_nan() && x[3].is_nan() && y[3].is_nan());
    }
}
