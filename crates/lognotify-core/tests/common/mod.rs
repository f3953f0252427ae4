//! In-memory remote used by the protocol tests.

use std::cell::RefCell;

use lognotify_core::{RemoteChannel, RemoteConfig, Result, SyncDelta};
use lognotify_fs::compute_checksum;
use lognotify_test_utils::skip_lines;

/// Serves a fixed byte buffer as the remote log and records every fetch.
#[derive(Debug, Default)]
pub struct InMemoryRemote {
    content: RefCell<Vec<u8>>,
    fetches: RefCell<Vec<usize>>,
}

#[allow(dead_code)]
impl InMemoryRemote {
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: RefCell::new(content.into()),
            fetches: RefCell::new(Vec::new()),
        }
    }

    pub fn set(&self, content: impl Into<Vec<u8>>) {
        *self.content.borrow_mut() = content.into();
    }

    pub fn append(&self, content: &[u8]) {
        self.content.borrow_mut().extend_from_slice(content);
    }

    pub fn content(&self) -> Vec<u8> {
        self.content.borrow().clone()
    }

    /// `skip_lines` of every fetch so far.
    pub fn fetches(&self) -> Vec<usize> {
        self.fetches.borrow().clone()
    }
}

impl RemoteChannel for InMemoryRemote {
    fn fetch(&self, _config: &RemoteConfig, skip: usize) -> Result<SyncDelta> {
        self.fetches.borrow_mut().push(skip);
        let content = self.content.borrow();
        Ok(SyncDelta {
            remote_digest: compute_checksum(&content),
            new_content: skip_lines(&content, skip).to_vec(),
        })
    }
}

#[allow(dead_code)]
pub fn config() -> RemoteConfig {
    RemoteConfig::new("example.org", "/var/log/messages")
}

/// `count` numbered lines starting at `from`.
#[allow(dead_code)]
pub fn lines(from: usize, count: usize) -> String {
    (from..from + count).map(|i| format!("line {i}\n")).collect()
}
