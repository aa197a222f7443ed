//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Multimap grouping with value-returning merge ([`GroupMap`])
//! - Size-based file grouping (Phase 1)
//! - Content digest grouping of same-size files (Phase 2)
//! - The end-to-end pipeline ([`DuplicateFinder`])

pub mod finder;
pub mod groups;

pub use finder::{
    group_by_digest, group_by_digest_lenient, validate_roots, DuplicateFinder, FinderConfig,
    FinderError, HashErrorPolicy, ScanSummary,
};
pub use groups::{DigestGroups, DuplicateGroup, DuplicateSet, GroupMap, SizeGroups};
