//! Per-log remote configuration
//!
//! Each identifier has a `<config_dir>/<identifier>.conf` file of
//! `key = value` lines:
//!
//! ```text
//! # web frontend access log
//! ssh_hostname = web-01.example.com
//! log_path = /var/log/nginx/access.log
//! ssh_options = -p 2222 -o ConnectTimeout=10
//! ```
//!
//! Leading whitespace is ignored, as are blank lines and lines starting
//! with `#`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Extension of per-log configuration files
pub const CONFIG_EXTENSION: &str = "conf";

const KEY_HOST: &str = "ssh_hostname";
const KEY_PATH: &str = "log_path";
const KEY_OPTIONS: &str = "ssh_options";

/// Connection and target parameters for one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Host passed to the transport
    pub host: String,
    /// Path of the log file on the remote host
    pub remote_path: String,
    /// Extra transport arguments, in shell-words syntax
    pub options: Option<String>,
}

impl RemoteConfig {
    pub fn new(host: impl Into<String>, remote_path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            remote_path: remote_path.into(),
            options: None,
        }
    }

    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }

    /// Split `options` into individual transport arguments.
    pub fn option_args(&self) -> std::result::Result<Vec<String>, shell_words::ParseError> {
        match &self.options {
            Some(options) => shell_words::split(options),
            None => Ok(Vec::new()),
        }
    }
}

/// Loads [`RemoteConfig`]s from a directory of `.conf` files.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    root: PathBuf,
}

impl ConfigLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the configuration files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the configuration file for `identifier`.
    pub fn path_for(&self, identifier: &str) -> Result<PathBuf> {
        lognotify_fs::validate_identifier(identifier)?;
        Ok(self.root.join(format!("{identifier}.{CONFIG_EXTENSION}")))
    }

    /// Read and validate the configuration for `identifier`.
    pub fn load(&self, identifier: &str) -> Result<RemoteConfig> {
        let path = self.path_for(identifier)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::ConfigNotFound {
                    identifier: identifier.to_string(),
                    path,
                });
            }
            Err(e) => {
                return Err(Error::config(
                    identifier,
                    format!("cannot read {}: {}", path.display(), e),
                ));
            }
        };

        tracing::debug!(identifier, path = %path.display(), "Loaded configuration");
        parse(identifier, &content)
    }
}

/// Parse configuration text for `identifier`.
pub fn parse(identifier: &str, content: &str) -> Result<RemoteConfig> {
    let mut host = None;
    let mut remote_path = None;
    let mut options = None;

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim_start();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(Error::config(
                identifier,
                format!("line {} is not a key = value pair", idx + 1),
            ));
        };
        let (key, value) = (key.trim(), value.trim().to_string());

        match key {
            KEY_HOST => host = Some(value),
            KEY_PATH => remote_path = Some(value),
            KEY_OPTIONS => options = Some(value),
            _ => tracing::warn!(identifier, key, line = idx + 1, "Ignoring unknown configuration key"),
        }
    }

    let config = RemoteConfig {
        host: required(identifier, KEY_HOST, host)?,
        remote_path: required(identifier, KEY_PATH, remote_path)?,
        options: options.filter(|o| !o.is_empty()),
    };

    for (key, value) in [(KEY_HOST, &config.host), (KEY_PATH, &config.remote_path)] {
        if value.starts_with('-') {
            return Err(Error::config(
                identifier,
                format!("'{key}' must not start with '-'"),
            ));
        }
    }

    config
        .option_args()
        .map_err(|e| Error::config(identifier, format!("{KEY_OPTIONS} cannot be parsed: {e}")))?;

    Ok(config)
}

fn required(identifier: &str, key: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        Some(_) => Err(Error::config(identifier, format!("'{key}' is empty"))),
        None => Err(Error::config(identifier, format!("missing required key '{key}'"))),
    }
}
