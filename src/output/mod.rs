//! Report formatters for scan results.
//!
//! - [`TextReport`] for people reading a terminal
//! - [`JsonReport`] for scripts
//!
//! Both list groups largest files first, then by digest.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::duplicates::DuplicateFinder;
//! use dupfind::error::ExitCode;
//! use dupfind::output::JsonReport;
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (set, summary) = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
//!
//! let report = JsonReport::new(&set, &summary, ExitCode::Success);
//! println!("{}", report.to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

pub use json::{JsonOutputError, JsonReport};
pub use text::TextReport;
