//! [`FakeRemote`] fixture for sync tests.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Script standing in for `ssh`: drops every argument except the last one
/// (the remote command) and runs it locally. Every invocation is recorded
/// in `ssh.calls` next to the script.
///
/// The script is run as `sh <script> ...` rather than executed directly so a
/// freshly written file is never exec'd while another test thread may still
/// hold it open (ETXTBSY).
///
/// `bin/shims` is put in front of `PATH` for the remote command, with the
/// original value kept in `REAL_PATH` so a shim can reach the real tool.
const FAKE_SSH: &str = r#"#!/bin/sh
for arg in "$@"; do
    command="$arg"
done
bin="$(dirname "$0")"
printf '%s\n' "$*" >> "$bin/ssh.calls"
REAL_PATH="$PATH"
PATH="$bin/shims:$PATH"
export REAL_PATH PATH
exec sh -c "$command"
"#;

/// A temporary "remote host" plus local config and cache directories.
///
/// # Example
///
/// ```rust,no_run
/// use lognotify_test_utils::FakeRemote;
///
/// let remote = FakeRemote::new();
/// remote.write_log("messages", "one\ntwo\n");
/// remote.write_config("messages");
/// assert!(remote.ssh_script().exists());
/// ```
pub struct FakeRemote {
    temp_dir: TempDir,
}

impl Default for FakeRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRemote {
    /// Create the directory layout and install the fake `ssh` script.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        for dir in ["bin", "remote", "config"] {
            fs::create_dir_all(temp_dir.path().join(dir)).unwrap();
        }

        let remote = Self { temp_dir };
        fs::write(remote.ssh_script(), FAKE_SSH).unwrap();
        remote
    }

    /// Root of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Transport program to configure: the system shell, which is handed
    /// [`FakeRemote::ssh_script`] through the `ssh_options` config key.
    pub fn ssh_program(&self) -> PathBuf {
        PathBuf::from("sh")
    }

    /// Path of the fake `ssh` script.
    pub fn ssh_script(&self) -> PathBuf {
        self.root().join("bin").join("ssh")
    }

    /// `ssh_options` value that routes the transport through the fake script.
    pub fn ssh_options(&self) -> String {
        format!("'{}'", self.ssh_script().display())
    }

    /// Directory holding `.conf` files.
    pub fn config_dir(&self) -> PathBuf {
        self.root().join("config")
    }

    /// Cache directory. Not created up front.
    pub fn cache_dir(&self) -> PathBuf {
        self.root().join("cache")
    }

    /// Path of the "remote" log for `name`.
    pub fn log_path(&self, name: &str) -> PathBuf {
        self.root().join("remote").join(format!("{name}.log"))
    }

    /// Path of the local cache file for `identifier`.
    pub fn cache_path(&self, identifier: &str) -> PathBuf {
        self.cache_dir().join(format!("{identifier}.log"))
    }

    /// Replace the remote log content.
    pub fn write_log(&self, name: &str, content: impl AsRef<[u8]>) {
        fs::write(self.log_path(name), content).unwrap();
    }

    /// Append to the remote log.
    pub fn append_log(&self, name: &str, content: impl AsRef<[u8]>) {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path(name))
            .unwrap();
        file.write_all(content.as_ref()).unwrap();
    }

    /// Write a config for `identifier` pointing at the remote log of the same name.
    pub fn write_config(&self, identifier: &str) {
        let content = format!(
            "# test log\nssh_hostname = fake-host\nlog_path = {}\nssh_options = {}\n",
            self.log_path(identifier).display(),
            self.ssh_options()
        );
        self.write_raw_config(identifier, &content);
    }

    /// Write arbitrary config text for `identifier`.
    pub fn write_raw_config(&self, identifier: &str, content: &str) {
        fs::write(self.config_dir().join(format!("{identifier}.conf")), content).unwrap();
    }

    /// Read the local cache for `identifier`.
    pub fn read_cache(&self, identifier: &str) -> Vec<u8> {
        fs::read(self.cache_path(identifier)).unwrap()
    }

    /// Pre-populate the local cache for `identifier`.
    pub fn seed_cache(&self, identifier: &str, content: impl AsRef<[u8]>) {
        fs::create_dir_all(self.cache_dir()).unwrap();
        fs::write(self.cache_path(identifier), content).unwrap();
    }

    /// Install an executable `name` shadowing the real tool on the remote side.
    ///
    /// `body` is a shell script; run the real tool with `PATH="$REAL_PATH"`.
    #[cfg(unix)]
    pub fn install_shim(&self, name: &str, body: &str) {
        use std::os::unix::fs::OpenOptionsExt;

        let dir = self.root().join("bin").join("shims");
        fs::create_dir_all(&dir).unwrap();
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o755)
            .open(dir.join(name))
            .unwrap();
        file.write_all(format!("#!/bin/sh\n{body}").as_bytes()).unwrap();
        file.sync_all().unwrap();
    }

    /// Argument lines the fake `ssh` has been invoked with so far.
    pub fn ssh_calls(&self) -> Vec<String> {
        match fs::read_to_string(self.root().join("bin").join("ssh.calls")) {
            Ok(calls) => calls.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }
}
