//! Audible rendering: playback-rate pitch shift and 16-bit PCM quantization.
//!
//! Seismic traces sampled at tens of Hz are inaudible as-is. Declaring the
//! same samples to play `pitch_factor` times faster moves the content up into
//! the audible range without resampling.

use crate::error::{Error, Result};
use crate::trace::peak_abs;

/// Symmetric full-scale value; `-32768` is never produced.
pub const PCM16_FULL_SCALE: i16 = 32767;

/// Peak-normalized 16-bit PCM with its declared playback rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioRendering {
    /// Declared playback rate in Hz.
    pub sample_rate_hz: u32,
    /// Samples in `[-32767, 32767]`.
    pub pcm: Vec<i16>,
}

impl AudioRendering {
    /// Number of PCM samples.
    pub fn len(&self) -> usize {
        self.pcm.len()
    }

    /// True if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.pcm.is_empty()
    }

    /// Playback duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.pcm.len() as f64 / f64::from(self.sample_rate_hz)
    }

    /// Largest absolute PCM value.
    pub fn peak(&self) -> i16 {
        self.pcm.iter().map(|s| s.saturating_abs()).max().unwrap_or(0)
    }

    /// Little-endian PCM bytes, ready for a WAV `data` chunk.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.pcm.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}

/// Declared output rate: `round(sampling_rate_hz * pitch_factor)`.
///
/// The two arguments fail with different kinds: the rate describes the input
/// samples, the pitch factor is a caller choice.
///
/// # Errors
///
/// - [`Error::InvalidInput`] when `sampling_rate_hz` is not positive and finite
/// - [`Error::InvalidParameter`] when `pitch_factor <= 0` or the resulting rate
///   does not fit a positive `u32`
pub fn output_sample_rate(sampling_rate_hz: f64, pitch_factor: i32) -> Result<u32> {
    if pitch_factor <= 0 {
        return Err(Error::invalid_parameter(format!(
            "pitch factor must be a positive integer, got {pitch_factor}"
        )));
    }
    if !sampling_rate_hz.is_finite() || sampling_rate_hz <= 0.0 {
        return Err(Error::invalid_input(format!(
            "sampling rate must be positive, got {sampling_rate_hz}"
        )));
    }
    let rate = (sampling_rate_hz * f64::from(pitch_factor)).round();
    if rate < 1.0 || rate > f64::from(u32::MAX) {
        return Err(Error::invalid_parameter(format!(
            "output sample rate {rate} Hz ({sampling_rate_hz} Hz x {pitch_factor}) is not representable"
        )));
    }
    Ok(rate as u32)
}

/// Normalize to the peak absolute value and quantize to 16-bit PCM.
///
/// `pcm[i] = clamp(round(samples[i] / peak * 32767), -32767, 32767)`.
///
/// # Errors
///
/// - [`Error::InvalidParameter`] for `pitch_factor <= 0`
/// - [`Error::InvalidInput`] for empty or non-finite input, or a sampling
///   rate that is not positive and finite
/// - [`Error::SilentSignal`] when every sample is zero
///
/// # Example
///
/// ```rust
/// use sismo_core::to_pcm16;
///
/// let audio = to_pcm16(&[0.0, 0.5, -1.0], 100.0, 2).unwrap();
/// assert_eq!(audio.sample_rate_hz, 200);
/// assert_eq!(audio.pcm, vec![0, 16384, -32767]);
/// ```
pub fn to_pcm16(samples: &[f64], sampling_rate_hz: f64, pitch_factor: i32) -> Result<AudioRendering> {
    let sample_rate_hz = output_sample_rate(sampling_rate_hz, pitch_factor)?;

    if samples.is_empty() {
        return Err(Error::invalid_input("cannot render audio from an empty sample sequence"));
    }
    if samples.iter().any(|s| !s.is_finite()) {
        return Err(Error::invalid_input("samples contain NaN or infinite values"));
    }

    let peak = peak_abs(samples);
    if peak == 0.0 {
        return Err(Error::SilentSignal);
    }

    let full_scale = f64::from(PCM16_FULL_SCALE);
    let pcm = samples
        .iter()
        .map(|&s| (s / peak * full_scale).round().clamp(-full_scale, full_scale) as i16)
        .collect();

    Ok(AudioRendering { sample_rate_hz, pcm })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_pitch() {
        for pitch in [0, -1, -8] {
            let err = to_pcm16(&[1.0], 100.0, pitch).unwrap_err();
            assert!(matches!(err, Error::InvalidParameter(_)));
        }
    }

    #[test]
    fn silent_signal_is_an_error() {
        assert_eq!(to_pcm16(&[0.0; 32], 100.0, 1), Err(Error::SilentSignal));
    }

    #[test]
    fn empty_and_non_finite_inputs_fail() {
        assert!(matches!(to_pcm16(&[], 100.0, 1), Err(Error::InvalidInput(_))));
        assert!(matches!(to_pcm16(&[1.0, f64::NAN], 100.0, 1), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn negative_peak_maps_to_negative_full_scale() {
        let audio = to_pcm16(&[0.25, -2.0, 1.0], 40.0, 1).unwrap();
        assert_eq!(audio.pcm, vec![4096, -32767, 16384]);
        assert_eq!(audio.peak(), 32767);
    }

    #[test]
    fn output_rate_rounds() {
        assert_eq!(output_sample_rate(100.0, 2).unwrap(), 200);
        assert_eq!(output_sample_rate(40.004, 3).unwrap(), 120);
        assert_eq!(output_sample_rate(0.5, 3).unwrap(), 2);
        assert!(output_sample_rate(0.2, 1).is_err());
    }

    #[test]
    fn bad_rate_is_input_error_bad_pitch_is_parameter_error() {
        for rate in [0.0, -100.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(output_sample_rate(rate, 2), Err(Error::InvalidInput(_))));
            assert!(matches!(to_pcm16(&[1.0], rate, 2), Err(Error::InvalidInput(_))));
        }
        // Pitch is checked first.
        assert!(matches!(output_sample_rate(f64::NAN, 0), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn le_bytes_layout() {
        let audio = AudioRendering {
            sample_rate_hz: 8,
            pcm: vec![1, -1, 32767],
        };
        assert_eq!(audio.to_le_bytes(), vec![0x01, 0x00, 0xFF, 0xFF, 0xFF, 0x7F]);
        assert_eq!(audio.duration_secs(), 3.0 / 8.0);
    }
}
