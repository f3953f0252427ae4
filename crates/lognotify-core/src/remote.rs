//! Remote execution channel
//!
//! One sync needs exactly one round trip to the remote host. The composed
//! command prints the `sha256sum` line of the whole remote file, followed by
//! the file content after the lines already cached:
//!
//! ```text
//! <64 hex digest>  -\n
//! <suffix bytes...>
//! ```
//!
//! The file size is captured first and both halves read exactly that many
//! bytes, so a writer appending during the fetch cannot make the digest and
//! the suffix describe different versions of the file.

use std::ffi::OsString;
use std::process::{Command, Stdio};

use lognotify_fs::is_checksum;

use crate::config::RemoteConfig;
use crate::{Error, Result};

/// Result of one remote query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncDelta {
    /// Digest of the entire remote file
    pub remote_digest: String,
    /// Remote content after the skipped lines
    pub new_content: Vec<u8>,
}

/// Executes the read-only fetch on a remote host.
pub trait RemoteChannel {
    /// Return the digest of the complete file at `config.remote_path` and its
    /// content after the first `skip_lines` lines.
    fn fetch(&self, config: &RemoteConfig, skip_lines: usize) -> Result<SyncDelta>;
}

impl<C: RemoteChannel + ?Sized> RemoteChannel for &C {
    fn fetch(&self, config: &RemoteConfig, skip_lines: usize) -> Result<SyncDelta> {
        (**self).fetch(config, skip_lines)
    }
}

impl<C: RemoteChannel + ?Sized> RemoteChannel for Box<C> {
    fn fetch(&self, config: &RemoteConfig, skip_lines: usize) -> Result<SyncDelta> {
        (**self).fetch(config, skip_lines)
    }
}

/// Default transport program
pub const DEFAULT_SSH_PROGRAM: &str = "ssh";

/// [`RemoteChannel`] backed by an ssh-compatible program.
///
/// Runs `<program> [options...] <host> <command>` with stdin closed.
#[derive(Debug, Clone)]
pub struct SshChannel {
    program: OsString,
}

impl Default for SshChannel {
    fn default() -> Self {
        Self::new(DEFAULT_SSH_PROGRAM)
    }
}

impl SshChannel {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }
}

impl RemoteChannel for SshChannel {
    fn fetch(&self, config: &RemoteConfig, skip_lines: usize) -> Result<SyncDelta> {
        let host = &config.host;
        let options = config
            .option_args()
            .map_err(|e| Error::remote(host, format!("cannot parse transport options: {e}")))?;
        let command = compose_command(&config.remote_path, skip_lines);

        tracing::debug!(
            host = %host,
            program = ?self.program,
            ?options,
            command = %command,
            "Executing remote fetch"
        );

        let output = Command::new(&self.program)
            .args(&options)
            .arg(host)
            .arg(&command)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                Error::remote(
                    host,
                    format!("cannot start {}: {}", self.program.to_string_lossy(), e),
                )
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();

        if !output.status.success() {
            let status = match output.status.code() {
                Some(code) => format!("exit code {code}"),
                None => "terminated by signal".to_string(),
            };
            let message = if stderr.is_empty() {
                format!("remote command failed ({status})")
            } else {
                format!("remote command failed ({status}): {stderr}")
            };
            return Err(Error::remote(host, message));
        }

        if !stderr.is_empty() {
            return Err(Error::remote(
                host,
                format!("remote command wrote to stderr: {stderr}"),
            ));
        }

        parse_output(host, output.stdout)
    }
}

/// Picks `sha256sum`, falling back to `shasum -a 256` on hosts without
/// GNU coreutils. Both print `<hex>  -` for stdin.
const DIGEST_SELECT: &str = "if command -v sha256sum >/dev/null 2>&1; \
     then digest=sha256sum; else digest='shasum -a 256'; fi;";

/// Build the shell command run on the remote host.
pub fn compose_command(remote_path: &str, skip_lines: usize) -> String {
    let snapshot = r#"head -c $size "$log""#;
    let mut script = format!(
        "log={}; {DIGEST_SELECT} size=$(wc -c < \"$log\") && {snapshot} | $digest && {snapshot}",
        shell_words::quote(remote_path)
    );
    if skip_lines > 0 {
        script.push_str(&format!(" | sed '1,{skip_lines}d'"));
    }

    format!("sh -c {}", shell_words::quote(&script))
}

/// Split raw remote output into digest and suffix.
pub fn parse_output(host: &str, mut stdout: Vec<u8>) -> Result<SyncDelta> {
    let Some(newline) = stdout.iter().position(|b| *b == b'\n') else {
        return Err(Error::remote(host, "output is missing the digest line"));
    };

    let new_content = stdout.split_off(newline + 1);
    let header = std::str::from_utf8(&stdout)
        .map_err(|_| Error::remote(host, "digest line is not valid UTF-8"))?;
    let digest = header.split_whitespace().next().unwrap_or_default();

    if !is_checksum(digest) {
        return Err(Error::remote(
            host,
            format!("unexpected digest line: {:?}", header.trim_end()),
        ));
    }

    Ok(SyncDelta {
        remote_digest: digest.to_string(),
        new_content,
    })
}
