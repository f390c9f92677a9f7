//! Sismo Core - signal conditioning for single-channel seismic traces
//!
//! Everything here is a pure function of its inputs: no I/O, no logging, no
//! global state. Readers in `sismo-io` produce a [`Trace`]; this crate turns
//! it into conditioned samples and audible PCM.
//!
//! # Stages
//!
//! - [`Trace`] - immutable samples plus sampling rate and source id
//! - [`detrend_mean`] - subtract the arithmetic mean
//! - [`bandpass`] / [`ZeroPhaseFilter`] - forward-backward Butterworth filtering
//!   (low-pass, high-pass or band-pass depending on which cutoff is zero)
//! - [`Conditioning`] - detrend + filter presets for the plot and convert paths
//! - [`to_pcm16`] - peak normalization and 16-bit quantization at a
//!   pitch-shifted playback rate
//!
//! # Filter design
//!
//! [`butterworth`] builds analog prototypes, maps them through the bilinear
//! transform and factors the result into [`SosCascade`]s of [`Biquad`]
//! sections.
//!
//! # Example
//!
//! ```rust
//! use sismo_core::{Conditioning, FilterSpec, Trace, to_pcm16};
//!
//! let samples: Vec<f64> = (0..1000)
//!     .map(|i| (std::f64::consts::TAU * 1.0 * i as f64 / 100.0).sin())
//!     .collect();
//! let trace = Trace::new(samples, 100.0).unwrap();
//!
//! let conditioned = Conditioning::for_convert(FilterSpec::new(0.0, 10.0))
//!     .apply(&trace)
//!     .unwrap();
//! let audio = to_pcm16(conditioned.samples(), trace.sampling_rate_hz(), 2).unwrap();
//! assert_eq!(audio.sample_rate_hz, 200);
//! assert_eq!(audio.pcm.len(), 1000);
//! ```

pub mod audio;
pub mod biquad;
pub mod butterworth;
pub mod condition;
pub mod detrend;
pub mod error;
pub mod filter;
pub mod trace;

pub use audio::{AudioRendering, PCM16_FULL_SCALE, output_sample_rate, to_pcm16};
pub use biquad::{Biquad, SosCascade};
pub use butterworth::{Band, design};
pub use condition::Conditioning;
pub use detrend::{detrend_mean, mean};
pub use error::{Error, Result};
pub use filter::{
    DEFAULT_CORNERS, FilterSpec, ZeroPhaseFilter, bandpass, bandpass_with_corners, filter_trace,
};
pub use trace::{Trace, peak_abs};
