//! Durable append-only I/O with file locking

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use fs2::FileExt;

use crate::{Error, Result};

/// Create `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
}

/// Create an empty file at `path` unless one already exists.
///
/// Returns `true` if the file was created by this call.
pub fn create_if_missing(path: &Path) -> Result<bool> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => {
            file.sync_all().map_err(|e| Error::io(path, e))?;
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Read the full content of a file.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::io(path, e))
}

/// Append `content` to an existing file and flush it to disk.
///
/// Holds an exclusive advisory lock on the file for the duration of the
/// write. If any part of the write fails, the file is truncated back to its
/// previous length so that either all of `content` lands or none of it does.
pub fn append_durable(path: &Path, content: &[u8]) -> Result<()> {
    if content.is_empty() {
        return Ok(());
    }

    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;

    file.lock_exclusive()
        .map_err(|_| Error::LockFailed { path: path.to_path_buf() })?;

    let original_len = file
        .metadata()
        .map_err(|e| Error::io(path, e))?
        .len();

    let written = file.write_all(content).and_then(|()| file.sync_all());
    if let Err(e) = written {
        rollback(&file, path, original_len);
        let _ = FileExt::unlock(&file);
        return Err(Error::io(path, e));
    }

    FileExt::unlock(&file)
        .map_err(|_| Error::LockFailed { path: path.to_path_buf() })?;

    Ok(())
}

fn rollback(file: &File, path: &Path, len: u64) {
    if let Err(e) = file.set_len(len).and_then(|()| file.sync_all()) {
        tracing::error!(
            path = %path.display(),
            error = %e,
            "Failed to roll back partial append"
        );
    }
}
