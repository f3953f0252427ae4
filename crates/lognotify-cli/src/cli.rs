//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;

/// lognotify - Incrementally mirror remote logs and show what is new
///
/// Each IDENTIFIER names a `<config-dir>/<IDENTIFIER>.conf` file giving the
/// `ssh_hostname` and `log_path` of a remote log. Lines appended to that log
/// since the last run are fetched over ssh, verified against a digest of the
/// whole remote file, appended to `<cache-dir>/<IDENTIFIER>.log` and printed.
#[derive(Parser, Debug)]
#[command(name = "lognotify")]
#[command(author, version, about, long_about)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory holding <IDENTIFIER>.conf files [default: ~/.config/lognotify]
    #[arg(long, env = "LOGNOTIFY_CONFIG_DIR", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Directory holding cached logs [default: ~/.cache/lognotify]
    #[arg(long, env = "LOGNOTIFY_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Program used to reach remote hosts
    #[arg(long, env = "LOGNOTIFY_SSH", value_name = "PROGRAM", default_value = "ssh")]
    pub ssh: PathBuf,

    /// Continue with the remaining logs when one fails
    #[arg(short = 'k', long)]
    pub keep_going: bool,

    /// Print one JSON object per log instead of progress text
    #[arg(long)]
    pub json: bool,

    /// Logs to sync, in order
    #[arg(required = true, value_name = "IDENTIFIER")]
    pub identifiers: Vec<String>,
}
