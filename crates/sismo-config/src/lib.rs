//! Settings for the sismo plot and convert pipelines.
//!
//! A single optional TOML file carries every tunable the two pipelines use:
//!
//! ```toml
//! [filter]
//! low_cutoff_hz = 0.5
//! high_cutoff_hz = 10.0
//! corners = 4
//!
//! [plot]
//! detrend_before_filter = true
//!
//! [convert]
//! detrend_before_filter = false
//! pitch_factor = 200
//! output_dir = "audio"
//!
//! [spectrogram]
//! fft_size = 256
//! overlap = 128
//! window = "hann"
//!
//! [render]
//! width = 1500
//! height = 1000
//! colormap = "turbo"
//! ```
//!
//! Missing sections and keys take their defaults.
//!
//! # Example
//!
//! ```rust
//! use sismo_config::Settings;
//!
//! let settings = Settings::from_toml("[convert]\npitch_factor = 50").unwrap();
//! assert_eq!(settings.convert.pitch_factor, 50);
//! assert!(settings.plot_conditioning().detrend_before_filter);
//! assert!(!settings.convert_conditioning().detrend_before_filter);
//! ```

mod error;
mod settings;

/// Platform-specific configuration paths.
pub mod paths;

/// Settings validation.
pub mod validation;

pub use error::ConfigError;
pub use paths::{SETTINGS_FILE, ensure_user_config_dir, find_settings, user_config_dir, user_settings_path};
pub use settings::{ConvertSettings, FilterSettings, PlotSettings, Settings};
pub use validation::{MAX_CORNERS, ValidationError, validate_settings};
