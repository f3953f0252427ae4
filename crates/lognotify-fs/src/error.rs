//! Error types for lognotify-fs

use std::path::PathBuf;

/// Result type for lognotify-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in lognotify-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Lock acquisition failed for {path}: is another lognotify run syncing it?")]
    LockFailed { path: PathBuf },

    #[error("Invalid log identifier {identifier:?}: {reason}")]
    InvalidIdentifier { identifier: String, reason: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
