//! Local cache storage for lognotify
//!
//! Provides the append-only on-disk mirror of each remote log, keyed by
//! identifier, along with the digest and line-counting helpers the sync
//! protocol verifies against.

pub mod cache;
pub mod checksum;
pub mod error;
pub mod io;
pub mod lines;

pub use cache::{CacheLock, CacheStore, validate_identifier};
pub use checksum::{compute_checksum, compute_concat_checksum, is_checksum};
pub use error::{Error, Result};
pub use lines::{count_lines, count_terminated_lines_from, unterminated_tail};
