//! Per-identifier log cache
//!
//! Each identifier maps to `<root>/<identifier>.log`. The cache file is only
//! ever created empty and appended to; line counts are recomputed from the
//! file on every call so that out-of-band edits are always observed.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::lines::count_terminated_lines_from;
use crate::{Error, Result, io};

/// Extension of cached log files
pub const LOG_EXTENSION: &str = "log";

/// Extension of per-identifier lock files
pub const LOCK_EXTENSION: &str = "lock";

/// Reject identifiers that cannot safely be used as a file name stem.
pub fn validate_identifier(identifier: &str) -> Result<()> {
    let reason = if identifier.is_empty() {
        Some("identifier is empty")
    } else if identifier == "." || identifier == ".." {
        Some("identifier must not be a relative path component")
    } else if identifier.contains(['/', '\\']) {
        Some("identifier must not contain path separators")
    } else if identifier.contains('\0') {
        Some("identifier must not contain NUL bytes")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidIdentifier {
            identifier: identifier.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Durable, append-only local mirror of remote logs keyed by identifier.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Create a store rooted at `root`. Nothing is touched on disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the cache files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the cache directory if it does not exist yet.
    pub fn ensure_root(&self) -> Result<()> {
        io::ensure_dir(&self.root)
    }

    /// Path of the cache file for `identifier`.
    pub fn path_for(&self, identifier: &str) -> Result<PathBuf> {
        self.file_for(identifier, LOG_EXTENSION)
    }

    /// Create an empty cache file for `identifier` unless one exists.
    pub fn ensure_exists(&self, identifier: &str) -> Result<()> {
        let path = self.path_for(identifier)?;
        if io::create_if_missing(&path)? {
            tracing::debug!(identifier, path = %path.display(), "Created empty cache file");
        }
        Ok(())
    }

    /// Number of `\n`-terminated records currently cached.
    ///
    /// Scans the whole file on every call. An unterminated last record is
    /// not counted, so the remote side resends it in full.
    pub fn line_count(&self, identifier: &str) -> Result<usize> {
        let path = self.path_for(identifier)?;
        let file = File::open(&path).map_err(|e| Error::io(&path, e))?;
        count_terminated_lines_from(file).map_err(|e| Error::io(&path, e))
    }

    /// Full cached content for `identifier`.
    pub fn read_all(&self, identifier: &str) -> Result<Vec<u8>> {
        io::read_bytes(&self.path_for(identifier)?)
    }

    /// Append `content` to the cache file and flush it before returning.
    pub fn append(&self, identifier: &str, content: &[u8]) -> Result<()> {
        io::append_durable(&self.path_for(identifier)?, content)
    }

    /// Take the advisory lock guarding `identifier` against concurrent syncs.
    ///
    /// Fails immediately rather than waiting if another process holds it.
    pub fn lock(&self, identifier: &str) -> Result<CacheLock> {
        let path = self.file_for(identifier, LOCK_EXTENSION)?;
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| Error::io(&path, e))?;

        file.try_lock_exclusive()
            .map_err(|_| Error::LockFailed { path: path.clone() })?;

        Ok(CacheLock { file, path })
    }

    fn file_for(&self, identifier: &str, extension: &str) -> Result<PathBuf> {
        validate_identifier(identifier)?;
        Ok(self.root.join(format!("{identifier}.{extension}")))
    }
}

/// Exclusive advisory lock on one identifier, released on drop.
#[derive(Debug)]
pub struct CacheLock {
    file: File,
    path: PathBuf,
}

impl CacheLock {
    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
