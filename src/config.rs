use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::timer::DEFAULT_REST_MINUTES;

/// User preferences. Tasks themselves are never written to disk.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    /// Length of a rest break in minutes.
    #[serde(default = "default_rest_minutes")]
    pub rest_minutes: u32,
}

fn default_rest_minutes() -> u32 {
    DEFAULT_REST_MINUTES
}

impl Default for Config {
    fn default() -> Self {
        Config { rest_minutes: DEFAULT_REST_MINUTES }
    }
}

/// Returns the path to the config file.
///
/// The path is determined in the following order:
/// 1. `TASKCLOCK_CONFIG` environment variable.
/// 2. `~/.config/taskclock/config.json` (on Linux).
/// 3. `./taskclock.json` (fallback).
pub fn config_path() -> PathBuf {
    std::env::var("TASKCLOCK_CONFIG").map(PathBuf::from).unwrap_or_else(|_| {
        match dirs::config_dir() {
            Some(mut p) => {
                p.push("taskclock");
                p.push("config.json");
                p
            }
            None => PathBuf::from("taskclock.json"),
        }
    })
}

/// Loads the config from the default location.
pub fn load() -> Config {
    load_from(&config_path())
}

/// Loads the config at `path`, falling back to defaults if the file is
/// missing or unreadable.
pub fn load_from(path: &Path) -> Config {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(_) => return Config::default(),
    };
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "ignoring malformed config");
        Config::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let cfg = load_from(&dir.path().join("nope.json"));
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.rest_minutes, 5);
    }

    #[test]
    fn reads_rest_minutes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "rest_minutes": 15 }"#).unwrap();
        assert_eq!(load_from(&path).rest_minutes, 15);
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "rest_minutes = 15").unwrap();
        assert_eq!(load_from(&path), Config::default());

        fs::write(&path, "{}").unwrap();
        assert_eq!(load_from(&path).rest_minutes, 5);
    }
}
