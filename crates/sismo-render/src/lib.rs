//! Sismo Render - two-panel PNG plots of a trace and its spectrogram
//!
//! - [`RenderConfig`] - image size, margins, colours and colour scaling
//! - [`Colormap`] - perceptually ordered colormaps (turbo by default)
//! - [`Canvas`] - RGB raster with the few primitives the plot needs
//! - [`TextRenderer`] - titles, axis labels and tick values
//! - [`render`] - waveform over spectrogram, encoded as PNG
//!
//! Both panels share one time axis `[0, duration]`, so a column of pixels
//! is the same instant in the waveform and in the spectrogram.
//!
//! ```rust
//! use sismo_analysis::spectrogram;
//! use sismo_core::Trace;
//! use sismo_render::{RenderConfig, render};
//!
//! let samples: Vec<f64> = (0..2000).map(|i| (i as f64 * 0.2).sin()).collect();
//! let trace = Trace::new(samples, 100.0).unwrap();
//! let spec = spectrogram(trace.samples(), trace.sampling_rate_hz()).unwrap();
//!
//! let config = RenderConfig { width: 600, height: 500, ..RenderConfig::default() };
//! let png = render(&trace, &spec, &config).unwrap();
//! assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
//! ```

pub mod canvas;
pub mod colormap;
pub mod config;
pub mod plot;
pub mod text;

pub use canvas::{Canvas, Rect};
pub use colormap::Colormap;
pub use config::RenderConfig;
pub use plot::{Layout, render, render_image};
pub use text::{Label, TextRenderer};

/// Errors raised while rendering.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration or image encoder failure.
    #[error("render error: {0}")]
    Render(String),

    /// Invalid trace or spectrogram input.
    #[error(transparent)]
    Core(#[from] sismo_core::Error),
}

impl Error {
    /// Create a render error.
    pub fn render(reason: impl Into<String>) -> Self {
        Self::Render(reason.into())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Self::Render(err.to_string())
    }
}

/// Convenience result type for rendering.
pub type Result<T> = std::result::Result<T, Error>;
