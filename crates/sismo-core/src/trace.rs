//! Single-channel trace container.

use crate::error::{Error, Result};

/// One channel of time-ordered samples plus its sampling rate.
///
/// A `Trace` is immutable once built. Processing stages never modify a trace
/// in place; they derive a new one with [`Trace::with_samples`], so the
/// original stays available for other consumers.
///
/// # Invariants
///
/// - at least one sample
/// - `sampling_rate_hz` is finite and strictly positive
///
/// # Example
///
/// ```rust
/// use sismo_core::Trace;
///
/// let trace = Trace::new(vec![0.0, 1.0, 0.0, -1.0], 2.0).unwrap();
/// assert_eq!(trace.time_axis(), vec![0.0, 0.5, 1.0, 1.5]);
/// assert_eq!(trace.duration_secs(), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    id: String,
    samples: Vec<f64>,
    sampling_rate_hz: f64,
}

impl Trace {
    /// Build a trace, validating the sample count and sampling rate.
    pub fn new(samples: Vec<f64>, sampling_rate_hz: f64) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::invalid_input("trace has no samples"));
        }
        if !sampling_rate_hz.is_finite() || sampling_rate_hz <= 0.0 {
            return Err(Error::invalid_input(format!(
                "sampling rate must be positive and finite, got {sampling_rate_hz}"
            )));
        }
        Ok(Self {
            id: String::new(),
            samples,
            sampling_rate_hz,
        })
    }

    /// Attach a source identifier (e.g. `IU.ANMO.00.BHZ`).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Derive a new trace with the same id and rate but different samples.
    pub fn with_samples(&self, samples: Vec<f64>) -> Result<Self> {
        Ok(Self::new(samples, self.sampling_rate_hz)?.with_id(self.id.clone()))
    }

    /// Source identifier; empty when the container did not provide one.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sample values.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Consume the trace and return its samples.
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    /// Sampling rate in Hz.
    pub fn sampling_rate_hz(&self) -> f64 {
        self.sampling_rate_hz
    }

    /// Nyquist frequency in Hz.
    pub fn nyquist_hz(&self) -> f64 {
        self.sampling_rate_hz / 2.0
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false: a trace holds at least one sample.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time in seconds of the sample at `index`, relative to the first sample.
    pub fn time_at(&self, index: usize) -> f64 {
        index as f64 / self.sampling_rate_hz
    }

    /// Relative time axis, `time_axis[i] = i / sampling_rate_hz`.
    pub fn time_axis(&self) -> Vec<f64> {
        (0..self.samples.len()).map(|i| self.time_at(i)).collect()
    }

    /// Duration covered by the samples, `len / sampling_rate_hz`.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sampling_rate_hz
    }

    /// Largest absolute sample value.
    pub fn peak_abs(&self) -> f64 {
        peak_abs(&self.samples)
    }
}

/// Largest absolute value in `samples` (0.0 for an empty slice).
pub fn peak_abs(samples: &[f64]) -> f64 {
    samples.iter().fold(0.0_f64, |acc, &s| acc.max(s.abs()))
}
