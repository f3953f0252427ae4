//! Shared test utilities for the lognotify workspace.
//!
//! This crate provides a fake remote host so the sync protocol can be tested
//! end to end without network access. It is a dev-dependency only and never
//! published.
//!
//! # Modules
//!
//! - [`remote`]: [`FakeRemote`] with a local stand-in for `ssh`
//! - [`lines`]: [`skip_lines`] for in-memory remotes

pub mod lines;
pub mod remote;

pub use lines::skip_lines;
pub use remote::FakeRemote;
