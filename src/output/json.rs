//! JSON report for scripting.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "groups": [
//!     {
//!       "digest": "5d41402abc4b2a76b9719d911017c592",
//!       "size": 1048577,
//!       "paths": ["/photos/a.jpg", "/backup/a-copy.jpg"]
//!     }
//!   ],
//!   "summary": {
//!     "roots": 2,
//!     "total_files": 100,
//!     "total_size": 1048576000,
//!     "skipped_entries": 0,
//!     "files_hashed": 12,
//!     "duplicate_groups": 1,
//!     "duplicate_files": 1,
//!     "reclaimable_space": 1048577,
//!     "scan_duration_ms": 1234,
//!     "hash_errors": [],
//!     "exit_code": 0,
//!     "exit_code_name": "DF000"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{DuplicateGroup, DuplicateSet, ScanSummary};
use crate::error::ExitCode;
use crate::scanner::Digest;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonGroup {
    /// Content digest, lowercase hex
    pub digest: Digest,
    /// File size in bytes
    pub size: u64,
    /// Paths as found during the walk
    pub paths: Vec<String>,
}

impl From<&DuplicateGroup> for JsonGroup {
    fn from(group: &DuplicateGroup) -> Self {
        Self {
            digest: group.digest.clone(),
            size: group.size,
            paths: group
                .paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Number of roots scanned
    pub roots: usize,
    /// Files above the size threshold
    pub total_files: usize,
    /// Their total size in bytes
    pub total_size: u64,
    /// Walk entries that could not be read
    pub skipped_entries: usize,
    /// Files whose content was hashed
    pub files_hashed: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Copies beyond the first in each group
    pub duplicate_files: usize,
    /// Bytes removing the copies would free
    pub reclaimable_space: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Files left out because they could not be read
    pub hash_errors: Vec<String>,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DF000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            roots: summary.roots,
            total_files: summary.total_files,
            total_size: summary.total_size,
            skipped_entries: summary.skipped_entries,
            files_hashed: summary.files_hashed,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            hash_errors: summary.hash_errors.iter().map(ToString::to_string).collect(),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    /// Duplicate groups, largest files first
    pub groups: Vec<JsonGroup>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonReport {
    /// Build the report from a scan result.
    #[must_use]
    pub fn new(set: &DuplicateSet, summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            groups: set.sorted_by_size().into_iter().map(JsonGroup::from).collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
