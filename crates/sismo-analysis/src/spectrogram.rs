//! STFT-based spectrogram generation
//!
//! Magnitude-mode short-time Fourier transform. Each frame is windowed,
//! transformed, and scaled by the window sum, so a full-scale sine of
//! amplitude `A` shows up near `A / 2` in its bin. Time bins sit at window
//! centres, which places the first column at `fft_size / 2 / fs` rather
//! than zero.

use serde::{Deserialize, Serialize};
use sismo_core::{Error, Result};

use crate::fft::{Fft, Window};

/// Default FFT length in samples.
pub const DEFAULT_FFT_SIZE: usize = 256;
/// Default overlap between consecutive frames in samples.
pub const DEFAULT_OVERLAP: usize = 128;
/// Floor applied before taking the log of a magnitude.
pub const LOG_FLOOR: f64 = 1e-10;

/// STFT parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrogramConfig {
    /// Samples per frame (FFT length).
    pub fft_size: usize,
    /// Samples shared by consecutive frames; `hop = fft_size - overlap`.
    pub overlap: usize,
    /// Taper applied to each frame.
    pub window: Window,
}

impl SpectrogramConfig {
    /// Hop between frame starts.
    pub fn hop_size(&self) -> usize {
        self.fft_size.saturating_sub(self.overlap)
    }

    /// Check `fft_size >= 2` and `overlap < fft_size`.
    pub fn validate(&self) -> Result<()> {
        if self.fft_size < 2 {
            return Err(Error::invalid_parameter(format!(
                "fft_size must be at least 2, got {}",
                self.fft_size
            )));
        }
        if self.overlap >= self.fft_size {
            return Err(Error::invalid_parameter(format!(
                "overlap ({}) must be smaller than fft_size ({})",
                self.overlap, self.fft_size
            )));
        }
        Ok(())
    }
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self {
            fft_size: DEFAULT_FFT_SIZE,
            overlap: DEFAULT_OVERLAP,
            window: Window::Hann,
        }
    }
}

/// Spectrogram data structure
///
/// `magnitudes[freq_bin][time_bin]`, with `freqs.len()` rows and
/// `times.len()` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    /// Non-negative magnitudes, one row per frequency bin.
    pub magnitudes: Vec<Vec<f64>>,
    /// Bin centre frequencies in Hz, `0..=fs/2`.
    pub freqs: Vec<f64>,
    /// Frame centre times in seconds from the first sample.
    pub times: Vec<f64>,
    /// FFT size used
    pub fft_size: usize,
    /// Hop size between frames
    pub hop_size: usize,
    /// Sampling rate of the analysed signal
    pub sampling_rate_hz: f64,
}

impl Spectrogram {
    /// Number of frequency bins (`fft_size / 2 + 1`).
    pub fn num_bins(&self) -> usize {
        self.freqs.len()
    }

    /// Number of time frames.
    pub fn num_frames(&self) -> usize {
        self.times.len()
    }

    /// Get magnitude at a frequency bin and time frame
    ///
    /// Returns None if out of bounds
    pub fn get(&self, bin: usize, frame: usize) -> Option<f64> {
        self.magnitudes.get(bin).and_then(|row| row.get(frame)).copied()
    }

    /// Magnitudes across frequency for one time frame.
    pub fn frame(&self, frame: usize) -> Option<Vec<f64>> {
        if frame >= self.num_frames() {
            return None;
        }
        Some(self.magnitudes.iter().map(|row| row[frame]).collect())
    }

    /// Find peak frequency at a given time frame
    pub fn peak_frequency(&self, frame: usize) -> Option<f64> {
        let spectrum = self.frame(frame)?;
        let (peak_bin, _) = spectrum
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))?;
        Some(self.freqs[peak_bin])
    }

    /// Natural log of every magnitude after flooring to [`LOG_FLOOR`].
    pub fn log_magnitudes(&self) -> Vec<Vec<f64>> {
        self.magnitudes
            .iter()
            .map(|row| row.iter().map(|&m| m.max(LOG_FLOOR).ln()).collect())
            .collect()
    }

    /// Largest magnitude in the spectrogram.
    pub fn max_magnitude(&self) -> f64 {
        self.magnitudes
            .iter()
            .flatten()
            .fold(0.0_f64, |acc, &m| acc.max(m))
    }
}

/// STFT (Short-Time Fourier Transform) analyzer
#[derive(Debug)]
pub struct StftAnalyzer {
    config: SpectrogramConfig,
    sampling_rate_hz: f64,
    fft: Fft,
    window_coeffs: Vec<f64>,
    window_sum: f64,
}

impl StftAnalyzer {
    /// Create a new STFT analyzer
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for an invalid [`SpectrogramConfig`] or a window
    /// that sums to zero; `InvalidInput` for a non-positive sampling rate.
    pub fn new(sampling_rate_hz: f64, config: SpectrogramConfig) -> Result<Self> {
        config.validate()?;
        if !sampling_rate_hz.is_finite() || sampling_rate_hz <= 0.0 {
            return Err(Error::invalid_input(format!(
                "sampling rate must be positive, got {sampling_rate_hz}"
            )));
        }
        let window_coeffs = config.window.coefficients(config.fft_size);
        let window_sum: f64 = window_coeffs.iter().sum();
        if window_sum <= 0.0 {
            return Err(Error::invalid_parameter(format!(
                "{} window of {} samples has zero area",
                config.window.name(),
                config.fft_size
            )));
        }
        Ok(Self {
            config,
            sampling_rate_hz,
            fft: Fft::new(config.fft_size),
            window_coeffs,
            window_sum,
        })
    }

    /// Analyzer with the default 256-point Hann window and 128-sample overlap.
    pub fn with_defaults(sampling_rate_hz: f64) -> Result<Self> {
        Self::new(sampling_rate_hz, SpectrogramConfig::default())
    }

    /// The parameters in use.
    pub fn config(&self) -> SpectrogramConfig {
        self.config
    }

    /// Get frequency resolution (Hz per bin)
    pub fn frequency_resolution(&self) -> f64 {
        self.sampling_rate_hz / self.config.fft_size as f64
    }

    /// Get time resolution (seconds per frame)
    pub fn time_resolution(&self) -> f64 {
        self.config.hop_size() as f64 / self.sampling_rate_hz
    }

    /// Number of frames produced for `len` samples.
    ///
    /// A signal shorter than one frame is zero padded to a single frame.
    pub fn num_frames(&self, len: usize) -> usize {
        let n = len.max(self.config.fft_size);
        (n - self.config.fft_size) / self.config.hop_size() + 1
    }

    /// Compute the spectrogram of `signal`.
    pub fn analyze(&self, signal: &[f64]) -> Result<Spectrogram> {
        if signal.is_empty() {
            return Err(Error::invalid_input("cannot analyse an empty signal"));
        }
        let fft_size = self.config.fft_size;
        let hop_size = self.config.hop_size();
        let num_bins = fft_size / 2 + 1;
        let num_frames = self.num_frames(signal.len());

        let mut padded;
        let signal = if signal.len() < fft_size {
            padded = signal.to_vec();
            padded.resize(fft_size, 0.0);
            padded.as_slice()
        } else {
            signal
        };

        let mut magnitudes = vec![Vec::with_capacity(num_frames); num_bins];
        let mut frame = vec![0.0; fft_size];
        for frame_idx in 0..num_frames {
            let start = frame_idx * hop_size;
            for ((dst, &src), &w) in frame
                .iter_mut()
                .zip(&signal[start..start + fft_size])
                .zip(&self.window_coeffs)
            {
                *dst = src * w;
            }

            let spectrum = self.fft.forward(&frame);
            for (row, c) in magnitudes.iter_mut().zip(&spectrum) {
                row.push(c.norm() / self.window_sum);
            }
        }

        let fs = self.sampling_rate_hz;
        let freqs = (0..num_bins).map(|k| k as f64 * fs / fft_size as f64).collect();
        let times = (0..num_frames)
            .map(|i| (fft_size as f64 / 2.0 + (i * hop_size) as f64) / fs)
            .collect();

        Ok(Spectrogram {
            magnitudes,
            freqs,
            times,
            fft_size,
            hop_size,
            sampling_rate_hz: fs,
        })
    }
}

/// Spectrogram of `samples` with the default parameters.
///
/// # Example
///
/// ```rust
/// use sismo_analysis::spectrogram;
///
/// let samples: Vec<f64> = (0..1000).map(|i| (i as f64 * 0.3).sin()).collect();
/// let spec = spectrogram(&samples, 100.0).unwrap();
/// assert_eq!(spec.freqs.len(), 129);
/// assert_eq!(spec.times.len(), 6);
/// assert_eq!(*spec.freqs.last().unwrap(), 50.0);
/// ```
pub fn spectrogram(samples: &[f64], sampling_rate_hz: f64) -> Result<Spectrogram> {
    StftAnalyzer::with_defaults(sampling_rate_hz)?.analyze(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq_hz: f64, fs: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (std::f64::consts::TAU * freq_hz * i as f64 / fs).sin())
            .collect()
    }

    #[test]
    fn default_shape() {
        let spec = spectrogram(&sine(5.0, 100.0, 1000), 100.0).unwrap();
        assert_eq!(spec.num_bins(), 129);
        assert_eq!(spec.num_frames(), (1000 - 256) / 128 + 1);
        assert_eq!(spec.magnitudes.len(), 129);
        assert!(spec.magnitudes.iter().all(|row| row.len() == spec.num_frames()));
        assert_eq!(spec.freqs[0], 0.0);
        assert_eq!(spec.freqs[128], 50.0);
        assert!((spec.times[0] - 1.28).abs() < 1e-12);
        assert!((spec.times[1] - 2.56).abs() < 1e-12);
    }

    #[test]
    fn short_signal_gives_one_frame() {
        let spec = spectrogram(&sine(5.0, 100.0, 40), 100.0).unwrap();
        assert_eq!(spec.num_frames(), 1);
        assert_eq!(spec.num_bins(), 129);
    }

    #[test]
    fn sine_peak_at_its_bin_with_half_amplitude() {
        // 12.5 Hz at 100 Hz lands exactly on bin 32 of a 256-point FFT.
        let spec = spectrogram(&sine(12.5, 100.0, 2048), 100.0).unwrap();
        for frame in 0..spec.num_frames() {
            assert_eq!(spec.peak_frequency(frame), Some(12.5));
            let m = spec.get(32, frame).unwrap();
            assert!((m - 0.5).abs() < 1e-3, "bin magnitude {m}");
        }
    }

    #[test]
    fn log_magnitudes_are_floored() {
        let spec = spectrogram(&[0.0; 300], 20.0).unwrap();
        let logs = spec.log_magnitudes();
        let floor = LOG_FLOOR.ln();
        assert!(logs.iter().flatten().all(|&v| v == floor));
        assert_eq!(spec.max_magnitude(), 0.0);
    }

    #[test]
    fn config_validation() {
        let bad_overlap = SpectrogramConfig {
            fft_size: 64,
            overlap: 64,
            window: Window::Hann,
        };
        assert!(matches!(bad_overlap.validate(), Err(Error::InvalidParameter(_))));
        let tiny = SpectrogramConfig {
            fft_size: 1,
            overlap: 0,
            window: Window::Hann,
        };
        assert!(tiny.validate().is_err());
        assert!(StftAnalyzer::new(0.0, SpectrogramConfig::default()).is_err());
        assert!(spectrogram(&[], 100.0).is_err());
    }

    #[test]
    fn two_point_hann_is_rejected() {
        let config = SpectrogramConfig {
            fft_size: 2,
            overlap: 0,
            window: Window::Hann,
        };
        assert!(StftAnalyzer::new(10.0, config).is_err());
        let rect = SpectrogramConfig {
            window: Window::Rectangular,
            ..config
        };
        assert!(StftAnalyzer::new(10.0, rect).is_ok());
    }
}
