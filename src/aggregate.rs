//! Case aggregation.
//!
//! Combines many per-case arrays into one population statistic per bin.
//! [`AggregationPolicy::TruncateToShortest`] tolerates ragged and all-NaN
//! inputs; [`AggregationPolicy::StrictEqualLength`] requires every array to
//! have the same length.
//!
//! The NaN-aware reductions skip missing bins. `Mean`, `Median`, `Sum` and
//! `Max` propagate NaN like their array-library counterparts; callers that
//! pick them accept that one bad case poisons the bin.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Elementwise reduction across the case axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    /// Arithmetic mean, NaN-propagating
    Mean,
    /// Mean of the non-NaN values
    #[default]
    NanMean,
    /// Median, NaN-propagating
    Median,
    /// Median of the non-NaN values
    NanMedian,
    /// Sum, NaN-propagating
    Sum,
    /// Maximum, NaN-propagating
    Max,
}

impl Reduction {
    /// Reduce one column of values.
    pub fn reduce(&self, values: &[f64]) -> f64 {
        match self {
            Reduction::Mean => mean(values),
            Reduction::NanMean => {
                let finite: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
                mean(&finite)
            }
            Reduction::Median => {
                if values.iter().any(|v| v.is_nan()) {
                    f64::NAN
                } else {
                    median(values.to_vec())
                }
            }
            Reduction::NanMedian => median(values.iter().copied().filter(|v| !v.is_nan()).collect()),
            Reduction::Sum => values.iter().sum(),
            Reduction::Max => {
                if values.is_empty() || values.iter().any(|v| v.is_nan()) {
                    f64::NAN
                } else {
                    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
                }
            }
        }
    }

    /// Short label used in file names and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Reduction::Mean => "mean",
            Reduction::NanMean => "nanmean",
            Reduction::Median => "median",
            Reduction::NanMedian => "nanmedian",
            Reduction::Sum => "sum",
            Reduction::Max => "max",
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// How arrays of possibly different length are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationPolicy {
    /// Drop empty and all-NaN arrays, trim survivors to the shortest
    #[default]
    TruncateToShortest,
    /// Require identical lengths
    StrictEqualLength,
}

/// Reduce column `index` of every array.
fn reduce_columns<A, F>(arrays: &[A], len: usize, mut reduce: F) -> Vec<f64>
where
    A: AsRef<[f64]>,
    F: FnMut(&[f64]) -> f64,
{
    let mut column = Vec::with_capacity(arrays.len());
    (0..len)
        .map(|index| {
            column.clear();
            column.extend(arrays.iter().map(|a| a.as_ref()[index]));
            reduce(&column)
        })
        .collect()
}

/// Truncate-to-shortest aggregation with an arbitrary reduction.
///
/// Returns an empty vector when no array survives the filter.
pub fn truncate_to_shortest_with<A, F>(arrays: &[A], reduce: F) -> Vec<f64>
where
    A: AsRef<[f64]>,
    F: FnMut(&[f64]) -> f64,
{
    let survivors: Vec<&[f64]> = arrays
        .iter()
        .map(|a| a.as_ref())
        .filter(|a| !a.is_empty() && !a.iter().all(|v| v.is_nan()))
        .collect();
    let Some(shortest) = survivors.iter().map(|a| a.len()).min() else {
        return Vec::new();
    };
    reduce_columns(&survivors, shortest, reduce)
}

/// Strict-equal-length aggregation with an arbitrary reduction.
///
/// An empty input list, or a list of only empty arrays, yields an empty
/// result. An empty array next to non-empty ones is a
/// [`AnalysisError::ShapeMismatch`].
pub fn strict_equal_length_with<A, F>(arrays: &[A], reduce: F) -> Result<Vec<f64>, AnalysisError>
where
    A: AsRef<[f64]>,
    F: FnMut(&[f64]) -> f64,
{
    let Some(first) = arrays.first() else {
        return Ok(Vec::new());
    };
    let expected = first.as_ref().len();
    for (index, array) in arrays.iter().enumerate().skip(1) {
        let found = array.as_ref().len();
        if found != expected {
            return Err(AnalysisError::ShapeMismatch { expected, found, index });
        }
    }
    Ok(reduce_columns(arrays, expected, reduce))
}

/// [`truncate_to_shortest_with`] using a [`Reduction`].
pub fn truncate_to_shortest<A: AsRef<[f64]>>(arrays: &[A], reduction: Reduction) -> Vec<f64> {
    truncate_to_shortest_with(arrays, |column| reduction.reduce(column))
}

/// [`strict_equal_length_with`] using a [`Reduction`].
pub fn strict_equal_length<A: AsRef<[f64]>>(arrays: &[A], reduction: Reduction) -> Result<Vec<f64>, AnalysisError> {
    strict_equal_length_with(arrays, |column| reduction.reduce(column))
}

/// Aggregate under the given policy.
pub fn aggregate<A: AsRef<[f64]>>(
    arrays: &[A],
    policy: AggregationPolicy,
    reduction: Reduction,
) -> Result<Vec<f64>, AnalysisError> {
    match policy {
        AggregationPolicy::TruncateToShortest => Ok(truncate_to_shortest(arrays, reduction)),
        AggregationPolicy::StrictEqualLength => strict_equal_length(arrays, reduction),
    }
}

/// Aggregate frequency axes and values of the same cases together.
///
/// Survivors are decided once per case from its values, so a case whose
/// values are all NaN is dropped from both outputs and the two results
/// always have the same length.
pub fn aggregate_paired<A: AsRef<[f64]>>(
    frequencies: &[A],
    values: &[A],
    policy: AggregationPolicy,
    reduction: Reduction,
) -> Result<(Vec<f64>, Vec<f64>), AnalysisError> {
    if frequencies.len() != values.len() {
        return Err(AnalysisError::ShapeMismatch {
            expected: values.len(),
            found: frequencies.len(),
            index: 0,
        });
    }
    for (index, (f, v)) in frequencies.iter().zip(values).enumerate() {
        let (f, v) = (f.as_ref(), v.as_ref());
        if f.len() != v.len() {
            return Err(AnalysisError::ShapeMismatch {
                expected: v.len(),
                found: f.len(),
                index,
            });
        }
    }

    match policy {
        AggregationPolicy::TruncateToShortest => {
            let survivors: Vec<usize> = values
                .iter()
                .enumerate()
                .filter(|(_, v)| {
                    let v = v.as_ref();
                    !v.is_empty() && !v.iter().all(|x| x.is_nan())
                })
                .map(|(index, _)| index)
                .collect();
            let Some(shortest) = survivors.iter().map(|&i| values[i].as_ref().len()).min() else {
                return Ok((Vec::new(), Vec::new()));
            };
            let kept_frequencies: Vec<&[f64]> = survivors.iter().map(|&i| frequencies[i].as_ref()).collect();
            let kept_values: Vec<&[f64]> = survivors.iter().map(|&i| values[i].as_ref()).collect();
            Ok((
                reduce_columns(&kept_frequencies, shortest, |c| reduction.reduce(c)),
                reduce_columns(&kept_values, shortest, |c| reduction.reduce(c)),
            ))
        }
        AggregationPolicy::StrictEqualLength => {
            let values = strict_equal_length(values, reduction)?;
            let frequency = strict_equal_length(frequencies, reduction)?;
            Ok((frequency, values))
        }
    }
}
