//! Shared CLI helpers used across multiple commands.

use clap::Args;
use sismo_config::Settings;
use std::path::Path;
use tracing::{debug, info};

/// Filter flags shared by `plot` and `convert`.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Low cutoff in Hz (0 disables it)
    #[arg(long, value_name = "HZ")]
    pub low_cutoff: Option<f64>,

    /// High cutoff in Hz (0 disables it)
    #[arg(long, value_name = "HZ")]
    pub high_cutoff: Option<f64>,

    /// Butterworth corners
    #[arg(long)]
    pub corners: Option<usize>,
}

impl FilterArgs {
    /// Overwrite the settings' filter section with any flags given.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(low) = self.low_cutoff {
            settings.filter.low_cutoff_hz = low;
        }
        if let Some(high) = self.high_cutoff {
            settings.filter.high_cutoff_hz = high;
        }
        if let Some(corners) = self.corners {
            settings.filter.corners = corners;
        }
    }
}

/// Load settings from `--config` or the user config dir, falling back to defaults.
pub fn load_settings(config: Option<&Path>) -> anyhow::Result<Settings> {
    let (settings, source) = Settings::discover(config)?;
    match source {
        Some(path) => info!(path = %path.display(), "loaded settings"),
        None => debug!("no settings file, using defaults"),
    }
    Ok(settings)
}

/// File name of `path` for display, or the full path if it has none.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_only_what_is_given() {
        let mut settings = Settings::default();
        settings.filter.low_cutoff_hz = 0.5;
        let args = FilterArgs {
            high_cutoff: Some(8.0),
            ..FilterArgs::default()
        };
        args.apply(&mut settings);
        assert_eq!(settings.filter.low_cutoff_hz, 0.5);
        assert_eq!(settings.filter.high_cutoff_hz, 8.0);
        assert_eq!(settings.filter.corners, 4);
    }

    #[test]
    fn display_name_uses_file_name() {
        assert_eq!(display_name(Path::new("/data/2024/quake.mseed")), "quake.mseed");
        assert_eq!(display_name(Path::new("/")), "/");
    }
}
