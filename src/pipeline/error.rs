use crate::catalog::CatalogError;
use crate::error::AnalysisError;
use crate::loader::LoadError;

/// Errors that can occur while running cases or batches
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Error from an analytical stage
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Error looking up an event
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Error loading pressure data
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// An event case was requested without an event catalog
    #[error("event cases need an event catalog")]
    NoCatalog,

    /// An aggregate had no contributing cases
    #[error("no contributing cases: {0}")]
    NoCases(String),
}
