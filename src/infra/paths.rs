// src/infra/paths.rs — Path management
//
// All paths respect the WEEKCOACH_HOME environment variable for isolation.
// When unset, config lives in ~/.weekcoach/ and data in XDG_DATA_HOME/weekcoach.

use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

fn weekcoach_home() -> Option<PathBuf> {
    std::env::var_os("WEEKCOACH_HOME").map(PathBuf::from)
}

/// Configuration directory: $WEEKCOACH_HOME/ or ~/.weekcoach/
pub fn config_dir() -> PathBuf {
    if let Some(home) = weekcoach_home() {
        return home;
    }
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(".weekcoach"),
        None => PathBuf::from(".weekcoach"),
    }
}

/// Data directory: $WEEKCOACH_HOME/data/ or ~/.local/share/weekcoach/
pub fn data_dir() -> PathBuf {
    if let Some(home) = weekcoach_home() {
        return home.join("data");
    }
    match ProjectDirs::from("", "", "weekcoach") {
        Some(dirs) => dirs.data_local_dir().to_path_buf(),
        None => config_dir().join("data"),
    }
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default location of the file-backed activity log.
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}
