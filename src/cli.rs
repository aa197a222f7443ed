//! Command-line interface definitions for dupfind.
//!
//! Options left unset on the command line fall back to the config file,
//! then to `DUPFIND_*` environment variables, then to built-in defaults
//! (see [`crate::config`]).
//!
//! # Example
//!
//! ```bash
//! # Files larger than 1 MB under two directories
//! dupfind ~/Pictures ~/Backup
//!
//! # Files larger than 10 MB, JSON report
//! dupfind --size 10 --output json ~/Downloads
//!
//! # Keep going past unreadable files
//! dupfind --keep-going /mnt/share
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::scanner::HashAlgorithm;

/// Find files with identical content across one or more directories.
///
/// Files are first grouped by size; only files sharing a size are read and
/// hashed. Files no larger than the size threshold are ignored.
#[derive(Debug, Parser)]
#[command(name = "dupfind")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directories to scan
    #[arg(value_name = "DIR", required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// Only consider files larger than this many megabytes [default: 1]
    ///
    /// Given without a value it means 1. Negative values are taken as
    /// their absolute value.
    #[arg(
        short,
        long,
        value_name = "MB",
        num_args = 0..=1,
        default_missing_value = "1",
        allow_negative_numbers = true
    )]
    pub size: Option<i64>,

    /// Content digest algorithm [default: md5]
    #[arg(short, long, value_enum)]
    pub algorithm: Option<HashAlgorithm>,

    /// Number of threads hashing concurrently [default: 4]
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(short = 'j', long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Follow symbolic links during the walk
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Gitignore-style patterns to leave out (can be repeated)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Skip files that cannot be read instead of aborting the scan
    #[arg(long)]
    pub keep_going: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Read settings from this file instead of the default location
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Do not draw progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and the report
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text listing
    Text,
    /// JSON for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
