//! Sismo Analysis - short-time spectral estimation for seismic traces
//!
//! - [`fft`] - FFT wrapper with windowing functions
//! - [`spectrogram`](mod@spectrogram) - magnitude-mode STFT
//!
//! The defaults follow the usual seismology plotting convention: 256-point
//! Hann frames with 128 samples of overlap, magnitudes scaled by the window
//! sum, and frame times at window centres.
//!
//! ## Spectrogram
//!
//! ```rust
//! use sismo_analysis::{SpectrogramConfig, StftAnalyzer, Window};
//!
//! let signal: Vec<f64> = (0..4096).map(|i| (i as f64 * 0.1).sin()).collect();
//! let config = SpectrogramConfig { fft_size: 512, overlap: 384, window: Window::Hamming };
//! let analyzer = StftAnalyzer::new(100.0, config).unwrap();
//! let spec = analyzer.analyze(&signal).unwrap();
//!
//! assert_eq!(spec.num_bins(), 257);
//! let peak = spec.peak_frequency(0).unwrap();
//! assert!((peak - 100.0 * 0.1 / std::f64::consts::TAU).abs() < 0.2);
//! ```

pub mod fft;
pub mod spectrogram;

pub use fft::{Fft, Window};
pub use spectrogram::{
    DEFAULT_FFT_SIZE, DEFAULT_OVERLAP, LOG_FLOOR, Spectrogram, SpectrogramConfig, StftAnalyzer,
    spectrogram,
};
