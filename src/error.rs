//! Exit codes and structured error output.

use serde::Serialize;

use crate::duplicates::{FinderError, ScanSummary};

/// Exit codes for the dupfind binary.
///
/// - 0: Success (with or without duplicates)
/// - 1: General error (including unreadable files without `--keep-going`)
/// - 2: A directory argument does not exist
/// - 3: Partial success (`--keep-going` skipped unreadable files)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Scan completed.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// A root directory does not exist; nothing was scanned.
    InvalidPath = 2,
    /// Scan completed but some files were left out.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DF000",
            Self::GeneralError => "DF001",
            Self::InvalidPath => "DF002",
            Self::PartialSuccess => "DF003",
        }
    }

    /// Exit code for a scan that ran to completion.
    #[must_use]
    pub fn for_summary(summary: &ScanSummary) -> Self {
        if summary.is_partial() {
            Self::PartialSuccess
        } else {
            Self::Success
        }
    }

    /// Pick the exit code for an error that ended the run.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<FinderError>() {
            Some(FinderError::InvalidRoot(_) | FinderError::NoRoots) => Self::InvalidPath,
            _ => Self::GeneralError,
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DF001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
        }
    }
}
