//! lognotify CLI
//!
//! Fetches the lines appended to remote logs since the last run and prints them.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::Cli;
use commands::SyncOptions;
use error::{CliError, Result};
use lognotify_core::Dirs;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so stdout carries only log lines
    if cli.verbose {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {e}")))?;
        tracing::debug!("Verbose mode enabled");
    }

    let dirs = Dirs::resolve(cli.config_dir.as_deref(), cli.cache_dir.as_deref())?;
    tracing::debug!(
        config_dir = %dirs.config_dir.display(),
        cache_dir = %dirs.cache_dir.display(),
        "Resolved directories"
    );

    let options = SyncOptions {
        dirs,
        ssh: cli.ssh,
        keep_going: cli.keep_going,
        json: cli.json,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::run_sync(&mut out, &options, &cli.identifiers)
}
