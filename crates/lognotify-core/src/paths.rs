//! Default locations of configuration and cache files

use std::path::{Path, PathBuf};

use crate::{Error, Result};

const APP_DIR: &str = "lognotify";

/// Resolved configuration and cache directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dirs {
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl Dirs {
    pub fn new(config_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }

    /// `~/.config/lognotify` and `~/.cache/lognotify`, with either replaced
    /// by an explicit override when given.
    pub fn resolve(config_override: Option<&Path>, cache_override: Option<&Path>) -> Result<Self> {
        let config_dir = match config_override {
            Some(dir) => dir.to_path_buf(),
            None => home_dir("config")?.join(".config").join(APP_DIR),
        };
        let cache_dir = match cache_override {
            Some(dir) => dir.to_path_buf(),
            None => home_dir("cache")?.join(".cache").join(APP_DIR),
        };

        Ok(Self::new(config_dir, cache_dir))
    }
}

fn home_dir(what: &'static str) -> Result<PathBuf> {
    dirs::home_dir().ok_or(Error::NoHomeDir { what })
}
