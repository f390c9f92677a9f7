//! Error types for the signal conditioning core.

use thiserror::Error;

/// Errors raised by core operations.
///
/// Every variant is a deterministic function of the input: nothing here is
/// transient, so callers should never retry.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// Empty sample sequence, non-finite samples, or an invalid trace shape.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Cutoffs that violate Nyquist, ordering, or sign constraints.
    #[error("invalid filter parameters: {0}")]
    FilterParameter(String),

    /// A non-filter parameter outside its domain (e.g. pitch factor <= 0).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// All samples are zero, so the signal cannot be peak-normalized.
    #[error("signal is silent: every sample is zero, cannot normalize")]
    SilentSignal,
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput(reason.into())
    }

    /// Create a filter parameter error.
    pub fn filter_parameter(reason: impl Into<String>) -> Self {
        Error::FilterParameter(reason.into())
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(reason: impl Into<String>) -> Self {
        Error::InvalidParameter(reason.into())
    }
}

/// Convenience result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
