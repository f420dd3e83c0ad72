//! Property tests for the shape rules that keep per-case arrays aligned.

use dustspec::aggregate::{truncate_to_shortest, Reduction};
use dustspec::ratio::{moving_average_of_ratio, ratio_trimmed};
use dustspec::smoothing::{pad_size, smooth};
use dustspec::spectral::{spectrum_of, SpectralKind};
use proptest::prelude::*;

fn odd_window() -> impl Strategy<Value = usize> {
    (0usize..12).prop_map(|k| 2 * k + 1)
}

fn positive_spectrum() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1e-6f64..1e3, 1..200)
}

proptest! {
    /// Smoothing keeps the input length and pads exactly `pad_size` bins at each end.
    #[test]
    fn test_smooth_preserves_length(magnitude in positive_spectrum(), window in odd_window()) {
        let frequency: Vec<f64> = (0..magnitude.len()).map(|i| i as f64 * 0.01).collect();
        let (f, m) = smooth(&frequency, &magnitude, window).unwrap();

        prop_assert_eq!(f.len(), magnitude.len());
        prop_assert_eq!(m.len(), magnitude.len());

        let n = magnitude.len();
        let pad = pad_size(window);
        let expected_nan = if n < window { n } else { 2 * pad };
        prop_assert_eq!(m.iter().filter(|v| v.is_nan()).count(), expected_nan);
        prop_assert_eq!(f.iter().filter(|v| v.is_nan()).count(), expected_nan);
    }

    /// Smoothed values stay within the range of the window they average.
    #[test]
    fn test_smooth_bounded_by_input(magnitude in positive_spectrum(), window in odd_window()) {
        let frequency: Vec<f64> = (0..magnitude.len()).map(|i| i as f64).collect();
        let (_, m) = smooth(&frequency, &magnitude, window).unwrap();
        let lo = magnitude.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = magnitude.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        for v in m.iter().filter(|v| !v.is_nan()) {
            prop_assert!(*v >= lo * (1.0 - 1e-9) && *v <= hi * (1.0 + 1e-9));
        }
    }

    /// The trimmed ratio drops `pad_size` bins at each end, or everything.
    #[test]
    fn test_trimmed_ratio_length(magnitude in positive_spectrum(), window in odd_window()) {
        let frequency: Vec<f64> = (0..magnitude.len()).map(|i| i as f64).collect();
        let (_, smoothed) = smooth(&frequency, &magnitude, window).unwrap();
        let (f, r) = ratio_trimmed(&frequency, &magnitude, &smoothed, window).unwrap();

        let n = magnitude.len();
        let pad = pad_size(window);
        let expected = if n > 2 * pad { n - 2 * pad } else { 0 };
        prop_assert_eq!(f.len(), expected);
        prop_assert_eq!(r.len(), expected);
    }

    /// Re-smoothing the ratio never changes its length.
    #[test]
    fn test_corrected_ratio_length(ratio in positive_spectrum(), window in odd_window()) {
        let frequency: Vec<f64> = (0..ratio.len()).map(|i| i as f64).collect();
        let (f, r) = moving_average_of_ratio(&frequency, &ratio, window).unwrap();
        prop_assert_eq!(f.len(), ratio.len());
        prop_assert_eq!(r.len(), ratio.len());
    }

    /// Truncation keeps the shortest surviving length.
    #[test]
    fn test_truncate_to_shortest_length(
        arrays in prop::collection::vec(prop::collection::vec(-10.0f64..10.0, 0..50), 0..8)
    ) {
        let result = truncate_to_shortest(&arrays, Reduction::NanMean);
        let expected = arrays.iter().filter(|a| !a.is_empty()).map(|a| a.len()).min().unwrap_or(0);
        prop_assert_eq!(result.len(), expected);
        for v in &result {
            prop_assert!(v.is_finite());
        }
    }

    /// Power spectra are non-negative with `N/2 + 1` bins.
    #[test]
    fn test_power_spectrum_shape(values in prop::collection::vec(-5.0f64..5.0, 2..256)) {
        let elapsed: Vec<f64> = (0..values.len()).map(|i| i as f64 * 0.5).collect();
        let spectrum = spectrum_of(&elapsed, &values, SpectralKind::Power).unwrap();

        prop_assert_eq!(spectrum.len(), values.len() / 2 + 1);
        prop_assert!(spectrum.magnitude.iter().all(|p| *p >= 0.0));
        prop_assert!(spectrum.frequency.iter().all(|f| *f <= 1.0 + 1e-12));
    }
}
