//! Signal conditioning: optional mean removal followed by optional filtering.
//!
//! The plot path and the convert path historically disagree on detrending:
//! plots remove the mean before filtering, audio conversion does not. Both
//! presets are kept here under explicit names instead of being unified.

use crate::detrend::detrend_mean;
use crate::error::Result;
use crate::filter::{DEFAULT_CORNERS, FilterSpec, filter_trace};
use crate::trace::Trace;

/// Conditioning applied to a trace before it reaches an output branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conditioning {
    /// Cutoffs for the zero-phase filter (both zero = no filtering).
    pub filter: FilterSpec,
    /// Butterworth corners per band edge.
    pub corners: usize,
    /// Remove the sample mean before filtering.
    pub detrend_before_filter: bool,
}

impl Conditioning {
    /// Plot-path preset: detrend, then filter.
    pub fn for_plot(filter: FilterSpec) -> Self {
        Self {
            filter,
            corners: DEFAULT_CORNERS,
            detrend_before_filter: true,
        }
    }

    /// Convert-path preset: filter the raw samples without detrending.
    pub fn for_convert(filter: FilterSpec) -> Self {
        Self {
            filter,
            corners: DEFAULT_CORNERS,
            detrend_before_filter: false,
        }
    }

    /// Override the number of corners.
    pub fn with_corners(mut self, corners: usize) -> Self {
        self.corners = corners;
        self
    }

    /// Override the detrend policy.
    pub fn with_detrend(mut self, detrend_before_filter: bool) -> Self {
        self.detrend_before_filter = detrend_before_filter;
        self
    }

    /// Run the conditioning, returning a new trace.
    ///
    /// Filter parameters are validated before any sample is touched, so a bad
    /// request fails without doing the detrend work.
    pub fn apply(&self, trace: &Trace) -> Result<Trace> {
        self.filter.band(trace.sampling_rate_hz())?;

        let detrended = if self.detrend_before_filter {
            trace.with_samples(detrend_mean(trace.samples())?)?
        } else {
            trace.clone()
        };
        filter_trace(&detrended, &self.filter, self.corners)
    }
}

impl Default for Conditioning {
    fn default() -> Self {
        Self::for_plot(FilterSpec::NONE)
    }
}
