// Video Pocket platform paths
//
// Linux:   $XDG_CONFIG_HOME/videopocket, $XDG_DATA_HOME/videopocket
// macOS:   ~/Library/Application Support/VideoPocket, data under Documents/
// Windows: %APPDATA%\VideoPocket, data under Documents\
//
// `VIDEOPOCKET_DATA_DIR` overrides the data directory on every platform.

use std::env;
use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "VIDEOPOCKET_DATA_DIR";

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

#[cfg(target_os = "linux")]
fn xdg_dir(var: &str, fallback: &[&str]) -> PathBuf {
    match env::var(var) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir).join("videopocket"),
        _ => fallback
            .iter()
            .fold(home_dir(), |path, part| path.join(part))
            .join("videopocket"),
    }
}

/// Returns the directory holding `settings.json`.
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        xdg_dir("XDG_CONFIG_HOME", &[".config"])
    }
    #[cfg(target_os = "macos")]
    {
        home_dir()
            .join("Library")
            .join("Application Support")
            .join("VideoPocket")
    }
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir().join("AppData").join("Roaming"))
            .join("VideoPocket")
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        home_dir().join(".videopocket")
    }
}

/// Returns the directory holding the database, thumbnails and downloads.
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    #[cfg(target_os = "linux")]
    {
        xdg_dir("XDG_DATA_HOME", &[".local", "share"])
    }
    // Downloads land in the data dir; it must not be the dir holding settings.json.
    #[cfg(not(target_os = "linux"))]
    {
        get_config_dir().join("Documents")
    }
}
