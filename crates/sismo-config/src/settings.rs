//! Settings file format and operations.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use sismo_analysis::SpectrogramConfig;
use sismo_core::{Conditioning, DEFAULT_CORNERS, FilterSpec};
use sismo_render::RenderConfig;

use crate::error::ConfigError;
use crate::paths::find_settings;
use crate::validation::validate_settings;

/// Band-pass cutoffs shared by both pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Lower cutoff in Hz; 0 disables it.
    pub low_cutoff_hz: f64,
    /// Upper cutoff in Hz; 0 disables it.
    pub high_cutoff_hz: f64,
    /// Butterworth corners per band edge.
    pub corners: usize,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            low_cutoff_hz: 0.0,
            high_cutoff_hz: 0.0,
            corners: DEFAULT_CORNERS,
        }
    }
}

impl FilterSettings {
    /// The cutoffs as a [`FilterSpec`].
    pub fn spec(&self) -> FilterSpec {
        FilterSpec::new(self.low_cutoff_hz, self.high_cutoff_hz)
    }
}

/// Plot pipeline options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    /// Remove the mean before filtering.
    pub detrend_before_filter: bool,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            detrend_before_filter: true,
        }
    }
}

/// Convert pipeline options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertSettings {
    /// Remove the mean before filtering.
    pub detrend_before_filter: bool,
    /// Playback-rate multiplier.
    pub pitch_factor: i32,
    /// Directory for WAV output; next to the input when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            detrend_before_filter: false,
            pitch_factor: 1,
            output_dir: None,
        }
    }
}

/// Everything read from a settings file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `[filter]`
    pub filter: FilterSettings,
    /// `[plot]`
    pub plot: PlotSettings,
    /// `[convert]`
    pub convert: ConvertSettings,
    /// `[spectrogram]`
    pub spectrogram: SpectrogramConfig,
    /// `[render]`
    pub render: RenderConfig,
}

impl Settings {
    /// Load and validate settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse and validate settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(toml_str)?;
        validate_settings(&settings)?;
        Ok(settings)
    }

    /// Resolve the settings file (explicit path, then user file) and load it.
    ///
    /// Returns the defaults and `None` when no file is found.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match find_settings(explicit) {
            Some(path) => Ok((Self::load(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    /// Serialize to pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Re-run validation, e.g. after command-line overrides.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Ok(validate_settings(self)?)
    }

    /// Conditioning for the plot pipeline.
    pub fn plot_conditioning(&self) -> Conditioning {
        Conditioning::for_plot(self.filter.spec())
            .with_corners(self.filter.corners)
            .with_detrend(self.plot.detrend_before_filter)
    }

    /// Conditioning for the convert pipeline.
    pub fn convert_conditioning(&self) -> Conditioning {
        Conditioning::for_convert(self.filter.spec())
            .with_corners(self.filter.corners)
            .with_detrend(self.convert.detrend_before_filter)
    }
}
