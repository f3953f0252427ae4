//! SyncEngine implementation
//!
//! The SyncEngine brings one identifier's cache up to date with its remote
//! log. The cached line count is recomputed from disk on every run instead
//! of being persisted, so any out-of-band change to the cache is picked up
//! by the next sync.
//!
//! Only `\n`-terminated records are counted, so when the cache ends in an
//! unterminated record the remote resends that record from its start. The
//! resent bytes must match the cached tail and are not appended twice.
//!
//! Every sync verifies that `sha256(cache ++ appended)` equals the digest of
//! the whole remote file before anything is written. A mismatch means the two
//! copies have diverged and the cache is left exactly as it was.

use lognotify_fs::{CacheStore, compute_concat_checksum, count_lines, unterminated_tail};

use crate::config::RemoteConfig;
use crate::remote::{RemoteChannel, SshChannel};
use crate::{Error, Result};

/// Result of a successful sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Terminated lines cached before this sync
    pub cached_line_count: usize,
    /// Lines in `appended_content`, counting an unterminated last one
    pub appended_line_count: usize,
    /// Bytes appended by this sync. When the cache ended mid-line this
    /// starts with the rest of that line.
    pub appended_content: Vec<u8>,
}

impl SyncOutcome {
    /// Whether the remote log had nothing new.
    pub fn is_empty(&self) -> bool {
        self.appended_content.is_empty()
    }
}

/// Progress reported while a sync runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    /// The cache was scanned
    Counted { lines: usize },
    /// The remote query is about to run
    Fetching,
    /// The remote query returned
    Fetched { bytes: usize },
    /// The delta matched the remote digest
    Verified,
}

/// Engine for incremental log synchronization
pub struct SyncEngine<C = SshChannel> {
    cache: CacheStore,
    channel: C,
}

impl<C: RemoteChannel> SyncEngine<C> {
    pub fn new(cache: CacheStore, channel: C) -> Self {
        Self { cache, channel }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Sync `identifier` against the remote log described by `config`.
    ///
    /// # Errors
    ///
    /// - [`Error::Cache`] if the cache cannot be created, read, locked or
    ///   appended to
    /// - [`Error::RemoteExecution`] if the remote query fails
    /// - [`Error::Integrity`] if the cache is not a prefix of the remote log;
    ///   nothing is written in that case
    pub fn sync(&self, identifier: &str, config: &RemoteConfig) -> Result<SyncOutcome> {
        self.sync_with(identifier, config, |_| {})
    }

    /// Same as [`SyncEngine::sync`], reporting each stage to `on_stage`.
    pub fn sync_with(
        &self,
        identifier: &str,
        config: &RemoteConfig,
        mut on_stage: impl FnMut(SyncStage),
    ) -> Result<SyncOutcome> {
        self.cache.ensure_exists(identifier)?;
        let _lock = self.cache.lock(identifier)?;

        let cached_lines = self.cache.line_count(identifier)?;
        tracing::debug!(identifier, cached_lines, "Counted cached lines");
        on_stage(SyncStage::Counted {
            lines: cached_lines,
        });

        on_stage(SyncStage::Fetching);
        let delta = self.channel.fetch(config, cached_lines)?;
        tracing::debug!(
            identifier,
            remote_digest = %delta.remote_digest,
            bytes = delta.new_content.len(),
            "Fetched remote delta"
        );
        on_stage(SyncStage::Fetched {
            bytes: delta.new_content.len(),
        });

        let cached = self.cache.read_all(identifier)?;
        let tail = unterminated_tail(&cached);
        let appended = delta
            .new_content
            .strip_prefix(tail)
            .unwrap_or(&delta.new_content);

        let local_digest = compute_concat_checksum(&cached, appended);
        if local_digest != delta.remote_digest {
            tracing::warn!(
                identifier,
                remote = %delta.remote_digest,
                local = %local_digest,
                "Cache diverged from remote log"
            );
            return Err(Error::Integrity {
                identifier: identifier.to_string(),
                remote: delta.remote_digest,
                local: local_digest,
            });
        }
        on_stage(SyncStage::Verified);

        if appended.is_empty() {
            return Ok(SyncOutcome {
                cached_line_count: cached_lines,
                ..SyncOutcome::default()
            });
        }

        self.cache.append(identifier, appended)?;
        let appended_lines = count_lines(appended);
        tracing::info!(
            identifier,
            appended_lines,
            bytes = appended.len(),
            completed_tail = !tail.is_empty(),
            "Appended new lines to cache"
        );

        Ok(SyncOutcome {
            cached_line_count: cached_lines,
            appended_line_count: appended_lines,
            appended_content: appended.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::SyncDelta;
    use lognotify_fs::compute_checksum;
    use tempfile::TempDir;

    struct StaticChannel(SyncDelta);

    impl RemoteChannel for StaticChannel {
        fn fetch(&self, _config: &RemoteConfig, _skip_lines: usize) -> Result<SyncDelta> {
            Ok(self.0.clone())
        }
    }

    fn engine(delta: SyncDelta) -> (TempDir, SyncEngine<StaticChannel>) {
        let temp = TempDir::new().unwrap();
        let cache = CacheStore::new(temp.path());
        (temp, SyncEngine::new(cache, StaticChannel(delta)))
    }

    fn config() -> RemoteConfig {
        RemoteConfig::new("example.org", "/var/log/messages")
    }

    #[test]
    fn reports_stages_in_order() {
        let (_temp, engine) = engine(SyncDelta {
            remote_digest: compute_checksum(b"a\n"),
            new_content: b"a\n".to_vec(),
        });
        let mut stages = Vec::new();

        engine.sync_with("messages", &config(), |s| stages.push(s)).unwrap();

        assert_eq!(
            stages,
            vec![
                SyncStage::Counted { lines: 0 },
                SyncStage::Fetching,
                SyncStage::Fetched { bytes: 2 },
                SyncStage::Verified,
            ]
        );
    }

    #[test]
    fn verified_is_not_reported_on_mismatch() {
        let (_temp, engine) = engine(SyncDelta {
            remote_digest: compute_checksum(b"something else"),
            new_content: b"a\n".to_vec(),
        });
        let mut stages = Vec::new();

        let result = engine.sync_with("messages", &config(), |s| stages.push(s));

        assert!(matches!(result, Err(Error::Integrity { .. })));
        assert!(!stages.contains(&SyncStage::Verified));
    }

    #[test]
    fn resent_tail_is_not_appended_twice() {
        let (_temp, engine) = engine(SyncDelta {
            remote_digest: compute_checksum(b"a\nbc\n"),
            new_content: b"bc\n".to_vec(),
        });
        engine.cache().ensure_exists("messages").unwrap();
        engine.cache().append("messages", b"a\nb").unwrap();
        let mut stages = Vec::new();

        let outcome = engine.sync_with("messages", &config(), |s| stages.push(s)).unwrap();

        assert_eq!(stages[0], SyncStage::Counted { lines: 1 });
        assert_eq!(outcome.appended_content, b"c\n");
        assert_eq!(outcome.appended_line_count, 1);
        assert_eq!(engine.cache().read_all("messages").unwrap(), b"a\nbc\n");
    }

    #[test]
    fn lock_is_released_after_sync() {
        let (_temp, engine) = engine(SyncDelta {
            remote_digest: compute_checksum(b""),
            new_content: Vec::new(),
        });

        engine.sync("messages", &config()).unwrap();

        assert!(engine.cache().lock("messages").is_ok());
    }

    #[test]
    fn held_lock_fails_sync_without_fetching() {
        let (_temp, engine) = engine(SyncDelta {
            remote_digest: compute_checksum(b""),
            new_content: Vec::new(),
        });
        engine.cache().ensure_exists("messages").unwrap();
        let _held = engine.cache().lock("messages").unwrap();

        let err = engine.sync("messages", &config()).unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::CacheAccess);
    }
}
