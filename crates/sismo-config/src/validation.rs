//! Settings validation.
//!
//! Checks run before any trace is loaded, so a bad settings file or flag is
//! reported without touching the input.

use thiserror::Error;

use crate::settings::Settings;

/// Highest Butterworth corner count accepted from settings.
pub const MAX_CORNERS: usize = 10;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Cutoff is negative, NaN or infinite.
    #[error("{field} must be a finite, non-negative frequency, got {value}")]
    InvalidCutoff {
        /// Settings key.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// Corner count outside `1..=MAX_CORNERS`.
    #[error("corners must be between 1 and {max}, got {0}", max = MAX_CORNERS)]
    InvalidCorners(usize),

    /// Pitch factor is zero or negative.
    #[error("pitch_factor must be a positive integer, got {0}")]
    InvalidPitch(i32),

    /// Unusable STFT parameters.
    #[error("spectrogram: {0}")]
    Spectrogram(String),

    /// Unusable image parameters.
    #[error("render: {0}")]
    Render(String),
}

/// Check every section of `settings`, stopping at the first problem.
///
/// Cutoffs are only checked for sign here; the Nyquist bound depends on the
/// trace and is enforced by the filter stage.
pub fn validate_settings(settings: &Settings) -> Result<(), ValidationError> {
    for (field, value) in [
        ("low_cutoff_hz", settings.filter.low_cutoff_hz),
        ("high_cutoff_hz", settings.filter.high_cutoff_hz),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::InvalidCutoff { field, value });
        }
    }
    if !(1..=MAX_CORNERS).contains(&settings.filter.corners) {
        return Err(ValidationError::InvalidCorners(settings.filter.corners));
    }
    if settings.convert.pitch_factor <= 0 {
        return Err(ValidationError::InvalidPitch(settings.convert.pitch_factor));
    }
    settings
        .spectrogram
        .validate()
        .map_err(|e| ValidationError::Spectrogram(e.to_string()))?;
    settings
        .render
        .validate()
        .map_err(|e| ValidationError::Render(e.to_string()))?;
    Ok(())
}
