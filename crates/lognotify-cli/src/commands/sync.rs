//! Sync command implementation
//!
//! Syncs each identifier in turn and reports progress as it goes. Output is
//! flushed after every fragment so progress is visible while the remote round
//! trip is still running.

use std::io::Write;
use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use colored::Colorize;
use serde::Serialize;

use lognotify_core::{
    CacheStore, ConfigLoader, Dirs, RemoteChannel, RemoteConfig, SshChannel, SyncEngine,
    SyncOutcome, SyncStage,
};

use crate::error::{CliError, Result};

/// Options for a sync run
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Configuration and cache locations
    pub dirs: Dirs,
    /// Transport program
    pub ssh: PathBuf,
    /// Report failures and continue with the next identifier
    pub keep_going: bool,
    /// Emit JSON records instead of progress text
    pub json: bool,
}

/// One JSON record per identifier
///
/// New lines are listed as strings when they are valid UTF-8. Otherwise they
/// are omitted and the raw bytes are given base64-encoded instead, so no byte
/// of the log is replaced.
#[derive(Debug, Serialize)]
struct SyncRecord<'a> {
    identifier: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cached_lines: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_line_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_lines: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_content_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> SyncRecord<'a> {
    fn success(identifier: &'a str, outcome: &SyncOutcome) -> Self {
        let (new_lines, new_content_base64) = match std::str::from_utf8(&outcome.appended_content) {
            Ok(text) => (Some(text.lines().map(str::to_string).collect()), None),
            Err(_) => (None, Some(BASE64.encode(&outcome.appended_content))),
        };
        Self {
            identifier,
            status: "ok",
            cached_lines: Some(outcome.cached_line_count),
            new_line_count: Some(outcome.appended_line_count),
            new_lines,
            new_content_base64,
            error_kind: None,
            error: None,
        }
    }

    fn failure(identifier: &'a str, error: &CliError) -> Self {
        let error_kind = match error {
            CliError::Core(e) => e.kind().to_string(),
            CliError::Fs(_) => "cache-access".to_string(),
            _ => "other".to_string(),
        };
        Self {
            identifier,
            status: "error",
            cached_lines: None,
            new_line_count: None,
            new_lines: None,
            new_content_base64: None,
            error_kind: Some(error_kind),
            error: Some(error.to_string()),
        }
    }
}

/// Run the sync command over `identifiers` using ssh as the transport.
pub fn run_sync(out: &mut impl Write, options: &SyncOptions, identifiers: &[String]) -> Result<()> {
    run_sync_with(out, options, identifiers, SshChannel::new(&options.ssh))
}

/// Run the sync command over `identifiers` with the given transport.
pub fn run_sync_with<C: RemoteChannel>(
    out: &mut impl Write,
    options: &SyncOptions,
    identifiers: &[String],
    channel: C,
) -> Result<()> {
    let loader = ConfigLoader::new(&options.dirs.config_dir);
    let engine = SyncEngine::new(CacheStore::new(&options.dirs.cache_dir), channel);
    let mut root_ready = false;

    let mut failed = 0;
    for identifier in identifiers {
        tracing::debug!(identifier = %identifier, "Syncing log");
        match sync_one(out, options, &loader, &engine, &mut root_ready, identifier) {
            Ok(()) => {}
            Err(e) if options.keep_going => {
                failed += 1;
                if options.json {
                    write_record(out, &SyncRecord::failure(identifier, &e))?;
                }
                eprintln!("{}: {}: {}", "error".red().bold(), identifier, e);
            }
            Err(e) => return Err(e),
        }
    }

    if failed > 0 {
        return Err(CliError::user(format!(
            "{} of {} logs failed to sync",
            failed,
            identifiers.len()
        )));
    }

    Ok(())
}

/// Load the configuration for `identifier`, then sync it.
///
/// The cache directory is created on the first identifier whose
/// configuration loads, so configuration errors never touch the cache.
fn sync_one<C: RemoteChannel>(
    out: &mut impl Write,
    options: &SyncOptions,
    loader: &ConfigLoader,
    engine: &SyncEngine<C>,
    root_ready: &mut bool,
    identifier: &str,
) -> Result<()> {
    let config = loader.load(identifier)?;
    if !*root_ready {
        engine.cache().ensure_root()?;
        *root_ready = true;
    }

    if options.json {
        let outcome = engine.sync(identifier, &config)?;
        write_record(out, &SyncRecord::success(identifier, &outcome))
    } else {
        sync_text(out, engine, identifier, &config)
    }
}

fn write_record(out: &mut impl Write, record: &SyncRecord<'_>) -> Result<()> {
    serde_json::to_writer(&mut *out, record)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn sync_text<C: RemoteChannel>(
    out: &mut impl Write,
    engine: &SyncEngine<C>,
    identifier: &str,
    config: &RemoteConfig,
) -> Result<()> {
    writeln!(out, "{} {}", "=>".blue().bold(), identifier.bold())?;
    out.flush()?;

    let mut last_stage = None;
    let mut write_error = None;
    let result = engine.sync_with(identifier, config, |stage| {
        last_stage = Some(stage);
        if let Err(e) = write_stage(out, stage) {
            write_error.get_or_insert(e);
        }
    });

    if let Some(e) = write_error {
        return Err(e.into());
    }

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            // Terminate the line left open by the stage in progress
            if matches!(
                last_stage,
                Some(SyncStage::Fetching | SyncStage::Fetched { .. })
            ) {
                writeln!(out, "{}", "FAILED".red().bold())?;
                out.flush()?;
            }
            return Err(e.into());
        }
    };

    writeln!(
        out,
        "{} Number of new lines: {}",
        "*".green().bold(),
        outcome.appended_line_count
    )?;
    writeln!(out)?;
    out.write_all(&outcome.appended_content)?;
    if !outcome.appended_content.ends_with(b"\n") {
        writeln!(out)?;
    }
    out.flush()?;

    Ok(())
}

fn write_stage(out: &mut impl Write, stage: SyncStage) -> std::io::Result<()> {
    let star = "*".green().bold();
    match stage {
        SyncStage::Counted { lines } => {
            writeln!(out, "{star} Counting lines in cached log... {lines}")?;
        }
        SyncStage::Fetching => {
            write!(out, "{star} Retrieving new lines via SSH... ")?;
        }
        SyncStage::Fetched { .. } => {
            writeln!(out, "Done")?;
            write!(out, "{star} Verifying against remote digest... ")?;
        }
        SyncStage::Verified => {
            writeln!(out, "{}", "OK".green())?;
        }
    }
    out.flush()
}
