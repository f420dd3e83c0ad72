//! Time-indexed pressure series.
//!
//! A [`PressureSeries`] is what a per-sol loader hands to the analytical
//! core: samples keyed by local civil timestamp, ordered, with duplicate
//! timestamps already collapsed.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::clock;

/// One barometer reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureSample {
    /// Local civil timestamp (sol mapped onto the mission calendar).
    pub timestamp: NaiveDateTime,
    /// Local true solar time label, `"SSSSS HH:MM:SS"`.
    pub ltst: String,
    /// Pressure in Pa (NaN when the reading is missing).
    pub pressure: f64,
}

impl PressureSample {
    /// Create a new sample.
    pub fn new(timestamp: NaiveDateTime, ltst: impl Into<String>, pressure: f64) -> Self {
        Self {
            timestamp,
            ltst: ltst.into(),
            pressure,
        }
    }
}

/// Ordered pressure samples.
///
/// Invariant: timestamps are non-decreasing and unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PressureSeries {
    samples: Vec<PressureSample>,
}

impl PressureSeries {
    /// Build a series from samples in any order.
    ///
    /// Samples are stably sorted by timestamp and duplicates are removed,
    /// keeping the first occurrence in input order.
    pub fn from_samples(mut samples: Vec<PressureSample>) -> Self {
        samples.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        samples.dedup_by(|later, earlier| later.timestamp == earlier.timestamp);
        Self { samples }
    }

    /// Concatenate several series (e.g. consecutive sols), keep-first on
    /// duplicate timestamps.
    pub fn concat<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = PressureSeries>,
    {
        let samples = parts.into_iter().flat_map(|p| p.samples).collect();
        Self::from_samples(samples)
    }

    /// Borrow the samples.
    pub fn samples(&self) -> &[PressureSample] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// First and last timestamps, if any.
    pub fn time_span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.samples.first()?.timestamp, self.samples.last()?.timestamp))
    }

    /// Samples strictly inside the open interval `(start, stop)`.
    pub fn between_exclusive(&self, start: NaiveDateTime, stop: NaiveDateTime) -> &[PressureSample] {
        let lo = self.samples.partition_point(|s| s.timestamp <= start);
        let hi = self.samples.partition_point(|s| s.timestamp < stop);
        if lo >= hi {
            &[]
        } else {
            &self.samples[lo..hi]
        }
    }

    /// Keep only the samples whose LTST label belongs to `sol`.
    pub fn retain_sol(&mut self, sol: u32) {
        let prefix = clock::ltst_prefix(sol);
        self.samples.retain(|s| s.ltst.get(..5) == Some(prefix.as_str()));
    }
}
