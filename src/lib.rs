//! dupfind - duplicate file finder
//!
//! Finds files with identical content across one or more directory trees.
//! Files are bucketed by size first; only files that share a size are read
//! and hashed, so most files are never opened.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Context;

use crate::cli::{Cli, OutputFormat};
use crate::config::Settings;
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::output::{JsonReport, TextReport};
use crate::progress::Progress;

/// Run a scan as described by the command line and print the report.
///
/// # Errors
///
/// Returns configuration errors, [`duplicates::FinderError`] for an invalid
/// root or an unreadable file, and I/O errors writing the report.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    settings.apply_cli(&cli);
    log::debug!("Effective settings: {:?}", settings);

    let show_progress = settings.progress && cli.output == OutputFormat::Text;
    let progress = Arc::new(Progress::new(!show_progress));
    let finder = DuplicateFinder::new(settings.finder_config().with_progress_callback(progress));

    let (set, summary) = finder.find_duplicates(&cli.paths)?;

    for err in &summary.hash_errors {
        log::warn!("Skipped unreadable file: {}", err);
    }
    if summary.skipped_entries > 0 {
        log::info!("{} entries could not be read during the walk", summary.skipped_entries);
    }

    let exit_code = ExitCode::for_summary(&summary);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.output {
        OutputFormat::Text => TextReport::new(&set, &summary, settings.size_mb)
            .write_to(&mut out)
            .context("Failed to write report")?,
        OutputFormat::Json => JsonReport::new(&set, &summary, exit_code)
            .write_to(&mut out, true)
            .context("Failed to write report")?,
    }
    out.flush()?;

    Ok(exit_code)
}
