//! Error taxonomy shared by the analytical core.
//!
//! Every stage of the spectral pipeline is a pure function that either
//! returns its derived arrays or one of these errors. Batch drivers catch
//! them per case and skip that case; see [`crate::pipeline`].

/// Errors raised by the analytical core (trend fit, spectra, smoothing,
/// aggregation, window selection).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    /// Not enough valid samples to fit a trend or estimate a spectrum.
    #[error("insufficient data: need at least {needed} valid samples, found {found}")]
    InsufficientData {
        /// Minimum number of samples required by the operation.
        needed: usize,
        /// Number of usable samples that were available.
        found: usize,
    },

    /// An upstream loader or window selection produced nothing to analyse.
    #[error("no data: {0}")]
    NoData(String),

    /// Strict aggregation received arrays of differing length.
    #[error("shape mismatch: array {index} has length {found}, expected {expected}")]
    ShapeMismatch {
        /// Length of the first array, which all others must match.
        expected: usize,
        /// Length of the offending array.
        found: usize,
        /// Position of the offending array in the input list.
        index: usize,
    },

    /// Moving-average window sizes must be odd and positive.
    #[error("invalid moving-average window size {0}: must be an odd integer >= 1")]
    InvalidWindowSize(usize),

    /// A numeric parameter is out of its valid domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl AnalysisError {
    pub(crate) fn insufficient(needed: usize, found: usize) -> Self {
        Self::InsufficientData { needed, found }
    }
}
