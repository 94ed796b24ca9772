/// Canonical location of the mover's config file.
///
/// Lives under the platform configuration directory:
///   - Linux   `$XDG_CONFIG_HOME/obs-recording-mover/config.toml`
///   - macOS   `~/Library/Application Support/obs-recording-mover/config.toml`
///   - Windows `%APPDATA%\obs-recording-mover\config.toml`
use std::path::PathBuf;

use crate::error::ConfigError;

const APP_DIR_NAME: &str = "obs-recording-mover";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Returns the mover's configuration directory.
pub fn app_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

/// Returns the full path to the config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(app_config_dir()?.join(CONFIG_FILE_NAME))
}
