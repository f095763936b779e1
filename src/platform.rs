// MangaHub platform paths
// Config and data directories per OS, selected with `cfg(target_os)`.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "mangahub";

#[cfg(target_os = "macos")]
const APP_DIR_TITLE: &str = "MangaHub";

fn home_dir() -> PathBuf {
    let var = if cfg!(target_os = "windows") { "USERPROFILE" } else { "HOME" };
    PathBuf::from(env::var(var).unwrap_or_else(|_| env::temp_dir().to_string_lossy().into_owned()))
}

/// Returns the configuration directory for MangaHub.
///
/// - **Linux**: `$XDG_CONFIG_HOME/mangahub`, else `~/.config/mangahub`
/// - **macOS**: `~/Library/Application Support/MangaHub`
/// - **Windows**: `%APPDATA%/mangahub`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        home_dir()
            .join("Library")
            .join("Application Support")
            .join(APP_DIR_TITLE)
    }
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir().join("AppData").join("Roaming"))
            .join(APP_DIR)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir().join(".config"))
            .join(APP_DIR)
    }
}

/// Returns the data directory for MangaHub, where the progress database lives.
///
/// - **Linux**: `$XDG_DATA_HOME/mangahub`, else `~/.local/share/mangahub`
/// - **macOS**: same as the config directory
/// - **Windows**: `%LOCALAPPDATA%/mangahub`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        env::var("LOCALAPPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir().join("AppData").join("Local"))
            .join(APP_DIR)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir().join(".local").join("share"))
            .join(APP_DIR)
    }
}
