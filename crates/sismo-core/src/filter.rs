//! Zero-phase Butterworth filtering driven by a pair of cutoffs.
//!
//! A [`FilterSpec`] holds a low and a high cutoff. Zero means "no bound":
//!
//! | low | high | result |
//! |-----|------|--------|
//! | 0   | 0    | passthrough, no filter machinery touched |
//! | 0   | > 0  | low-pass at `high` |
//! | > 0 | 0    | high-pass at `low` |
//! | > 0 | > 0  | band-pass between `low` and `high` |
//!
//! A zero bound is never handed to the band-pass design.

use crate::biquad::SosCascade;
use crate::butterworth::{self, Band};
use crate::error::{Error, Result};
use crate::trace::Trace;

/// Number of Butterworth corners (prototype order) used by default.
pub const DEFAULT_CORNERS: usize = 4;

/// Requested cutoffs in Hz; `0` disables that side of the band.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterSpec {
    /// Lower cutoff in Hz (0 = no low cutoff).
    pub low_cutoff_hz: f64,
    /// Upper cutoff in Hz (0 = no high cutoff).
    pub high_cutoff_hz: f64,
}

impl FilterSpec {
    /// No filtering.
    pub const NONE: Self = Self {
        low_cutoff_hz: 0.0,
        high_cutoff_hz: 0.0,
    };

    /// Create a filter spec from a low and a high cutoff.
    pub fn new(low_cutoff_hz: f64, high_cutoff_hz: f64) -> Self {
        Self {
            low_cutoff_hz,
            high_cutoff_hz,
        }
    }

    /// True when both cutoffs are zero.
    pub fn is_passthrough(&self) -> bool {
        self.low_cutoff_hz == 0.0 && self.high_cutoff_hz == 0.0
    }

    /// Resolve the cutoffs into a validated [`Band`] for `sampling_rate_hz`.
    ///
    /// Returns `Ok(None)` for a passthrough spec.
    ///
    /// # Errors
    ///
    /// [`Error::FilterParameter`] for negative or non-finite cutoffs, an
    /// active cutoff at or above Nyquist, or `low >= high` when both are set.
    pub fn band(&self, sampling_rate_hz: f64) -> Result<Option<Band>> {
        let low = active_cutoff("low", self.low_cutoff_hz)?;
        let high = active_cutoff("high", self.high_cutoff_hz)?;
        let band = match (low, high) {
            (None, None) => return Ok(None),
            (None, Some(cutoff_hz)) => Band::Lowpass { cutoff_hz },
            (Some(cutoff_hz), None) => Band::Highpass { cutoff_hz },
            (Some(low_hz), Some(high_hz)) => Band::Bandpass { low_hz, high_hz },
        };
        band.validate(sampling_rate_hz)?;
        Ok(Some(band))
    }
}

/// Maps a zero cutoff to "no bound" after checking its sign.
fn active_cutoff(side: &str, cutoff_hz: f64) -> Result<Option<f64>> {
    if !cutoff_hz.is_finite() || cutoff_hz < 0.0 {
        return Err(Error::filter_parameter(format!(
            "{side} cutoff must be a finite, non-negative frequency, got {cutoff_hz}"
        )));
    }
    Ok((cutoff_hz > 0.0).then_some(cutoff_hz))
}

/// A designed zero-phase filter, reusable across traces at one sampling rate.
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroPhaseFilter {
    band: Band,
    sampling_rate_hz: f64,
    cascade: SosCascade,
}

impl ZeroPhaseFilter {
    /// Design a filter for `band` with `corners` Butterworth poles per edge.
    pub fn new(band: Band, corners: usize, sampling_rate_hz: f64) -> Result<Self> {
        let cascade = butterworth::design(band, corners, sampling_rate_hz)?;
        Ok(Self {
            band,
            sampling_rate_hz,
            cascade,
        })
    }

    /// The band this filter was designed for.
    pub fn band(&self) -> Band {
        self.band
    }

    /// Sampling rate the filter was designed for.
    pub fn sampling_rate_hz(&self) -> f64 {
        self.sampling_rate_hz
    }

    /// Underlying second-order sections.
    pub fn cascade(&self) -> &SosCascade {
        &self.cascade
    }

    /// Apply forward and backward (zero net phase).
    pub fn apply(&self, samples: &[f64]) -> Vec<f64> {
        self.cascade.filtfilt(samples)
    }

    /// Effective magnitude response of the forward-backward pass at `freq_hz`.
    pub fn magnitude(&self, freq_hz: f64) -> f64 {
        self.cascade.magnitude(freq_hz, self.sampling_rate_hz).powi(2)
    }
}

/// Zero-phase Butterworth filtering of a sample sequence.
///
/// `low_hz == 0 && high_hz == 0` returns the input unchanged. Otherwise a
/// [`DEFAULT_CORNERS`]-corner low-pass, high-pass or band-pass is applied
/// forward and backward.
///
/// # Errors
///
/// [`Error::FilterParameter`] when `high_hz >= sampling_rate_hz / 2`, when
/// `low_hz >= high_hz` with both non-zero, or for negative cutoffs.
///
/// # Example
///
/// ```rust
/// use sismo_core::bandpass;
///
/// let samples = vec![0.0, 1.0, 0.0, -1.0];
/// assert_eq!(bandpass(&samples, 0.0, 0.0, 100.0).unwrap(), samples);
/// assert!(bandpass(&samples, 1.0, 50.0, 100.0).is_err());
/// ```
pub fn bandpass(samples: &[f64], low_hz: f64, high_hz: f64, sampling_rate_hz: f64) -> Result<Vec<f64>> {
    bandpass_with_corners(samples, low_hz, high_hz, sampling_rate_hz, DEFAULT_CORNERS)
}

/// [`bandpass`] with an explicit number of corners.
pub fn bandpass_with_corners(
    samples: &[f64],
    low_hz: f64,
    high_hz: f64,
    sampling_rate_hz: f64,
    corners: usize,
) -> Result<Vec<f64>> {
    let spec = FilterSpec::new(low_hz, high_hz);
    match spec.band(sampling_rate_hz)? {
        None => Ok(samples.to_vec()),
        Some(band) => Ok(ZeroPhaseFilter::new(band, corners, sampling_rate_hz)?.apply(samples)),
    }
}

/// Filter a whole trace, returning a new trace.
pub fn filter_trace(trace: &Trace, spec: &FilterSpec, corners: usize) -> Result<Trace> {
    match spec.band(trace.sampling_rate_hz())? {
        None => Ok(trace.clone()),
        Some(band) => {
            let filter = ZeroPhaseFilter::new(band, corners, trace.sampling_rate_hz())?;
            trace.with_samples(filter.apply(trace.samples()))
        }
    }
}
