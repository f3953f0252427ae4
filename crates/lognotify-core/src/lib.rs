//! Incremental remote log synchronization for lognotify
//!
//! This crate implements the sync protocol on top of `lognotify-fs`:
//!
//! - **Configuration**: per-identifier `.conf` files resolved into a [`RemoteConfig`]
//! - **Remote channel**: one ssh round trip returning the remote digest and delta
//! - **SyncEngine**: count, fetch, verify, append
//!
//! # Architecture
//!
//! ```text
//!                lognotify-cli
//!                      |
//!               lognotify-core
//!               /            \
//!      lognotify-fs      ssh (RemoteChannel)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use lognotify_core::{CacheStore, ConfigLoader, Dirs, SshChannel, SyncEngine};
//!
//! fn example() -> lognotify_core::Result<()> {
//!     let dirs = Dirs::resolve(None, None)?;
//!     let config = ConfigLoader::new(&dirs.config_dir).load("messages")?;
//!
//!     let cache = CacheStore::new(&dirs.cache_dir);
//!     cache.ensure_root()?;
//!
//!     let engine = SyncEngine::new(cache, SshChannel::default());
//!     let outcome = engine.sync("messages", &config)?;
//!     println!("{} new lines", outcome.appended_line_count);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod paths;
pub mod remote;
pub mod sync;

pub use config::{ConfigLoader, RemoteConfig};
pub use error::{Error, ErrorKind, Result};
pub use lognotify_fs::CacheStore;
pub use paths::Dirs;
pub use remote::{RemoteChannel, SshChannel, SyncDelta};
pub use sync::{SyncEngine, SyncOutcome, SyncStage};
