//! Platform-specific paths for the settings file.
//!
//! - Linux: `~/.config/sismo/settings.toml`
//! - macOS: `~/Library/Application Support/sismo/settings.toml`
//! - Windows: `%APPDATA%\sismo\settings.toml`

use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "sismo";

/// Settings file name inside the config directory.
pub const SETTINGS_FILE: &str = "settings.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to `./sismo` if the platform config directory is unknown.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the default settings file location.
pub fn user_settings_path() -> PathBuf {
    user_config_dir().join(SETTINGS_FILE)
}

/// Locate the settings file to load.
///
/// An explicit path always wins, even if it does not exist (loading it then
/// reports the missing file). Otherwise the user settings file is used when
/// present, and `None` means built-in defaults.
pub fn find_settings(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let user = user_settings_path();
    user.is_file().then_some(user)
}

/// Ensure the user config directory exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_config_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_config_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}
