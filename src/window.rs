//! Analysis window selection.
//!
//! A window is a contiguous slice of a [`PressureSeries`] around a
//! reference instant, with an elapsed-time axis in seconds. All interval
//! bounds are open at both ends. An empty window is a normal result;
//! callers check [`AnalysisWindow::is_empty`].

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::clock::{self, duration_from_secs, seconds_between};
use crate::error::AnalysisError;
use crate::series::{PressureSample, PressureSeries};

/// How the elapsed-time axis is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElapsedAxis {
    /// Seconds relative to the last sample (all values <= 0).
    CountdownToLast,
    /// Seconds since the first sample (all values >= 0).
    SinceFirst,
}

/// One sample inside a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSample {
    /// Local civil timestamp
    pub timestamp: NaiveDateTime,
    /// Seconds on the window's elapsed axis
    pub elapsed: f64,
    /// Pressure (Pa), NaN when missing
    pub pressure: f64,
}

/// Contiguous slice of a pressure series around a reference instant.
///
/// Invariant: `elapsed` increases with sample order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    reference: NaiveDateTime,
    axis: ElapsedAxis,
    samples: Vec<WindowSample>,
}

impl AnalysisWindow {
    /// Build a window from (timestamp, pressure) pairs in time order.
    pub fn from_points(reference: NaiveDateTime, axis: ElapsedAxis, points: Vec<(NaiveDateTime, f64)>) -> Self {
        let anchor = match axis {
            ElapsedAxis::CountdownToLast => points.last().map(|p| p.0),
            ElapsedAxis::SinceFirst => points.first().map(|p| p.0),
        };
        let samples = points
            .into_iter()
            .map(|(timestamp, pressure)| WindowSample {
                timestamp,
                elapsed: anchor.map(|a| seconds_between(a, timestamp)).unwrap_or(0.0),
                pressure,
            })
            .collect();
        Self {
            reference,
            axis,
            samples,
        }
    }

    fn from_slice(reference: NaiveDateTime, axis: ElapsedAxis, slice: &[PressureSample]) -> Self {
        Self::from_points(reference, axis, slice.iter().map(|s| (s.timestamp, s.pressure)).collect())
    }

    /// Reference instant (event time, or window start for fixed windows).
    pub fn reference(&self) -> NaiveDateTime {
        self.reference
    }

    /// Anchor of the elapsed axis.
    pub fn axis(&self) -> ElapsedAxis {
        self.axis
    }

    /// Samples in time order.
    pub fn samples(&self) -> &[WindowSample] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Elapsed-time axis.
    pub fn elapsed(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.elapsed).collect()
    }

    /// Pressure values.
    pub fn pressures(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.pressure).collect()
    }
}

/// Samples in `(reference - offset - duration, reference - offset)`,
/// counting down to the last selected sample.
pub fn select_before(series: &PressureSeries, reference: NaiveDateTime, duration: f64, offset: f64) -> AnalysisWindow {
    let stop = reference - duration_from_secs(offset);
    let start = stop - duration_from_secs(duration);
    let window = AnalysisWindow::from_slice(reference, ElapsedAxis::CountdownToLast, series.between_exclusive(start, stop));
    debug!("Before-window {} .. {}: {} samples", start, stop, window.len());
    window
}

/// Samples in `(reference + offset, reference + offset + duration)`,
/// counting up from the first selected sample.
pub fn select_after(series: &PressureSeries, reference: NaiveDateTime, duration: f64, offset: f64) -> AnalysisWindow {
    let start = reference + duration_from_secs(offset);
    let stop = start + duration_from_secs(duration);
    let window = AnalysisWindow::from_slice(reference, ElapsedAxis::SinceFirst, series.between_exclusive(start, stop));
    debug!("After-window {} .. {}: {} samples", start, stop, window.len());
    window
}

/// Samples in `(reference - duration, reference)`: the approach up to the
/// event itself.
pub fn select_on_event(series: &PressureSeries, reference: NaiveDateTime, duration: f64) -> AnalysisWindow {
    select_before(series, reference, duration, 0.0)
}

/// Samples in `(start, start + duration)` where `start` is `hour:00:00` on
/// the given sol's local civil clock.
pub fn select_fixed_local_time(
    series: &PressureSeries,
    sol: u32,
    hour: u32,
    duration: f64,
) -> Result<AnalysisWindow, AnalysisError> {
    if sol > clock::MAX_SOL {
        return Err(AnalysisError::InvalidParameter(format!("sol must be 0..={}, got {}", clock::MAX_SOL, sol)));
    }
    let time = NaiveTime::from_hms_opt(hour, 0, 0)
        .ok_or_else(|| AnalysisError::InvalidParameter(format!("hour must be 0..=23, got {}", hour)))?;
    let start = clock::sol_date(sol).and_time(time);
    let stop = start + duration_from_secs(duration);
    let window = AnalysisWindow::from_slice(start, ElapsedAxis::CountdownToLast, series.between_exclusive(start, stop));
    debug!("Fixed window sol {} {:02}:00 +{}s: {} samples", sol, hour, duration, window.len());
    Ok(window)
}

/// Finest resample cadence accepted, in seconds.
pub const MIN_RESAMPLE_CADENCE: f64 = 1e-3;

/// Most buckets a single resampled window may hold.
pub const MAX_RESAMPLE_BUCKETS: usize = 4_000_000;

/// Re-index a window onto a uniform grid of `cadence` seconds.
///
/// Buckets are aligned to whole multiples of the cadence counted from
/// midnight of the first sample's day and labelled by their left edge.
/// Each bucket holds the mean of its non-missing pressures; buckets
/// without any reading carry NaN and are dropped later by the trend fit.
/// The elapsed axis is recomputed on the bucket labels.
///
/// Fails when the cadence is below [`MIN_RESAMPLE_CADENCE`] or the window
/// would span more than [`MAX_RESAMPLE_BUCKETS`] buckets.
pub fn resample(window: &AnalysisWindow, cadence: f64) -> Result<AnalysisWindow, AnalysisError> {
    check_cadence(cadence)?;
    let Some(first) = window.samples.first() else {
        return Ok(window.clone());
    };
    let origin = first.timestamp.date().and_time(NaiveTime::MIN);
    let bucket_of = |t: NaiveDateTime| (seconds_between(origin, t) / cadence).floor() as i64;

    let first_bucket = bucket_of(first.timestamp);
    let last_bucket = window.samples.last().map(|s| bucket_of(s.timestamp)).unwrap_or(first_bucket);
    let n_buckets = (last_bucket - first_bucket + 1).max(0) as usize;
    if n_buckets > MAX_RESAMPLE_BUCKETS {
        return Err(AnalysisError::InvalidParameter(format!(
            "resampling {:.1}s at {}s needs {} buckets, limit is {}",
            seconds_between(first.timestamp, window.samples.last().map_or(first.timestamp, |s| s.timestamp)),
            cadence,
            n_buckets,
            MAX_RESAMPLE_BUCKETS
        )));
    }

    let mut sums = vec![0.0; n_buckets];
    let mut counts = vec![0usize; n_buckets];
    for sample in &window.samples {
        let index = (bucket_of(sample.timestamp) - first_bucket) as usize;
        if sample.pressure.is_finite() {
            sums[index] += sample.pressure;
            counts[index] += 1;
        }
    }

    let points = (0..n_buckets)
        .map(|i| {
            let label = origin + duration_from_secs((first_bucket + i as i64) as f64 * cadence);
            let mean = if counts[i] > 0 {
                sums[i] / counts[i] as f64
            } else {
                f64::NAN
            };
            (label, mean)
        })
        .collect();

    let resampled = AnalysisWindow::from_points(window.reference, window.axis, points);
    debug!(
        "Resampled {} samples onto {} buckets of {}s (origin {:02}:00)",
        window.len(),
        resampled.len(),
        cadence,
        origin.hour()
    );
    Ok(resampled)
}

/// Check a resample cadence against [`MIN_RESAMPLE_CADENCE`].
pub fn check_cadence(cadence: f64) -> Result<(), AnalysisError> {
    if !(cadence.is_finite() && cadence >= MIN_RESAMPLE_CADENCE) {
        return Err(AnalysisError::InvalidParameter(format!(
            "resample cadence must be at least {}s, got {}",
            MIN_RESAMPLE_CADENCE, cadence
        )));
    }
    Ok(())
}
