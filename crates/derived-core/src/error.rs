//! Error types for derived-series computation
//!
//! Provides a unified error type for all derived-series crates.

use thiserror::Error;

/// Core error type for derived-series operations
#[derive(Error, Debug)]
pub enum Error {
    /// The configured base reference matched no known series
    #[error("Unresolved base reference: {0}")]
    UnresolvedBaseReference(String),

    /// Bin width resolved to zero, a negative number or a non-finite value
    #[error("Degenerate bin width: {width}")]
    DegenerateBinWidth { width: f64 },

    /// Bin-count heuristic name not recognised
    #[error("Unknown bin count heuristic: {0}")]
    UnknownBinCountHeuristic(String),

    /// A sample was NaN or infinite
    #[error("Non-finite sample at index {index}: {value}")]
    NonFiniteSample { index: usize, value: f64 },

    /// The requested binning would produce more bins than allowed
    #[error("Too many bins: {requested} requested, limit is {limit}")]
    TooManyBins { requested: usize, limit: usize },

    /// A point index outside the current series
    #[error("Point index {index} out of range for series of length {len}")]
    PointOutOfRange { index: usize, len: usize },

    /// Lock or notification failure
    #[error("Execution error: {0}")]
    Execution(String),

    /// Other errors
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error for a base reference that could not be resolved
    pub fn unresolved(reference: impl std::fmt::Display) -> Self {
        Self::UnresolvedBaseReference(reference.to_string())
    }

    /// Create an error for a poisoned lock
    pub fn poisoned(what: &str) -> Self {
        Self::Execution(format!("Failed to lock {what}"))
    }

    /// Whether the error describes a degenerate bin width
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::DegenerateBinWidth { .. })
    }
}
