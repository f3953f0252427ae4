//! Error types for lognotify-core

use std::fmt;
use std::path::PathBuf;

/// Result type for lognotify-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while syncing a remote log
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found for an identifier
    #[error("Configuration for '{identifier}' not found at {path}")]
    ConfigNotFound { identifier: String, path: PathBuf },

    /// Configuration file present but unusable
    #[error("Invalid configuration for '{identifier}': {message}")]
    InvalidConfig { identifier: String, message: String },

    /// Identifier cannot name a cache or config file
    #[error("Invalid identifier '{identifier}': {reason}")]
    InvalidIdentifier { identifier: String, reason: String },

    /// Cache directories could not be determined
    #[error("Could not determine {what} directory: no home directory found")]
    NoHomeDir { what: &'static str },

    /// Local cache error from lognotify-fs
    #[error(transparent)]
    Cache(lognotify_fs::Error),

    /// The remote command could not run or produced unusable output
    #[error("Remote execution on {host} failed: {message}")]
    RemoteExecution { host: String, message: String },

    /// Cached content plus delta does not hash to the remote digest
    #[error(
        "Integrity check failed for '{identifier}': remote digest {remote}, local digest {local}. \
         The remote log was rewritten or the cache was modified; the cache was left untouched"
    )]
    Integrity {
        identifier: String,
        remote: String,
        local: String,
    },
}

impl From<lognotify_fs::Error> for Error {
    fn from(err: lognotify_fs::Error) -> Self {
        match err {
            lognotify_fs::Error::InvalidIdentifier { identifier, reason } => {
                Self::InvalidIdentifier { identifier, reason }
            }
            other => Self::Cache(other),
        }
    }
}

/// Coarse classification of [`Error`], used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    CacheAccess,
    RemoteExecution,
    Integrity,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigNotFound { .. }
            | Self::InvalidConfig { .. }
            | Self::InvalidIdentifier { .. }
            | Self::NoHomeDir { .. } => ErrorKind::Config,
            Self::Cache(_) => ErrorKind::CacheAccess,
            Self::RemoteExecution { .. } => ErrorKind::RemoteExecution,
            Self::Integrity { .. } => ErrorKind::Integrity,
        }
    }

    pub(crate) fn remote(host: &str, message: impl Into<String>) -> Self {
        Self::RemoteExecution {
            host: host.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn config(identifier: &str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            identifier: identifier.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Config => write!(f, "config"),
            ErrorKind::CacheAccess => write!(f, "cache-access"),
            ErrorKind::RemoteExecution => write!(f, "remote-execution"),
            ErrorKind::Integrity => write!(f, "integrity"),
        }
    }
}
