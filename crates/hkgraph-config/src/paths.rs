//! Platform-specific configuration paths.
//!
//! - **User config**: `~/.config/hkgraph/` (Linux), `~/Library/Application Support/hkgraph/` (macOS), `%APPDATA%\hkgraph\` (Windows)
//! - **Default config file**: `graph.toml` inside the user config directory

use std::path::{Path, PathBuf};

/// Application name used for directory paths.
const APP_NAME: &str = "hkgraph";

/// File name of the default graph configuration.
pub const CONFIG_FILE_NAME: &str = "graph.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the path of the default configuration file.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE_NAME)
}

/// Ensure the user config directory exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_config_dir() -> Result<PathBuf, crate::ConfigError> {
    let dir = user_config_dir();
    ensure_dir(&dir)?;
    Ok(dir)
}

pub(crate) fn ensure_dir(dir: &Path) -> Result<(), crate::ConfigError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| crate::ConfigError::create_dir(dir, e))?;
    }
    Ok(())
}
