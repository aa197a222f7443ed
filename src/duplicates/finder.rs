//! Duplicate finder implementation with two-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Validate** - every root must exist before anything is walked
//! 2. **Phase 1 - Size grouping**: walk each root, bucket files by exact size,
//!    merge the buckets across roots (see [`crate::duplicates::groups`])
//! 3. **Phase 2 - Content hashing**: digest only files whose size bucket has
//!    two or more members, group by digest, keep digests shared by 2+ files
//!
//! A file alone in its size bucket is never opened. The cost of a scan is one
//! stat per file plus one full read per file that shares its size.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_min_size(1024 * 1024));
//! let (duplicates, summary) = finder
//!     .find_duplicates(&[PathBuf::from("/home/user/Pictures")])
//!     .unwrap();
//!
//! for group in duplicates.iter() {
//!     println!("{}: {:?}", group.digest, group.paths);
//! }
//! println!("Took {:?}", summary.scan_duration);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::groups::{DigestGroups, DuplicateSet, SizeGroups};
use crate::progress::{ProgressCallback, PHASE_HASHING, PHASE_WALKING};
use crate::scanner::{Digest, HashAlgorithm, HashError, Hasher, Walker, WalkerConfig};

/// What to do when a file cannot be read during hashing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashErrorPolicy {
    /// Abort the whole scan on the first unreadable file.
    #[default]
    Abort,
    /// Leave the file out, record the error and keep going.
    Collect,
}

/// Group same-size files by content digest, stopping at the first failure.
///
/// Paths are hashed in input order; paths with equal digests keep their
/// relative order in the output bucket.
///
/// # Errors
///
/// Returns the first [`HashError`]; the remaining paths are not hashed.
///
/// # Example
///
/// ```no_run
/// use dupfind::duplicates::group_by_digest;
/// use dupfind::scanner::Hasher;
/// use std::path::PathBuf;
///
/// let paths = vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")];
/// let groups = group_by_digest(&paths, &Hasher::default()).unwrap();
/// println!("{} distinct contents", groups.len());
/// ```
pub fn group_by_digest(paths: &[PathBuf], hasher: &Hasher) -> Result<DigestGroups, HashError> {
    group_by_digest_with(paths, hasher, |_| {})
}

/// Group same-size files by content digest, skipping unreadable files.
///
/// Returns the groups built from every readable file together with the
/// errors for the files that were left out.
#[must_use]
pub fn group_by_digest_lenient(
    paths: &[PathBuf],
    hasher: &Hasher,
) -> (DigestGroups, Vec<HashError>) {
    group_by_digest_lenient_with(paths, hasher, |_| {})
}

fn group_by_digest_with(
    paths: &[PathBuf],
    hasher: &Hasher,
    on_file: impl Fn(&Path),
) -> Result<DigestGroups, HashError> {
    let mut groups = DigestGroups::new();
    for path in paths {
        on_file(path);
        let digest = hasher.digest_file(path)?;
        groups.insert(digest, path.clone());
    }
    Ok(groups)
}

fn group_by_digest_lenient_with(
    paths: &[PathBuf],
    hasher: &Hasher,
    on_file: impl Fn(&Path),
) -> (DigestGroups, Vec<HashError>) {
    let mut groups = DigestGroups::new();
    let mut errors = Vec::new();
    for path in paths {
        on_file(path);
        match hasher.digest_file(path) {
            Ok(digest) => groups.insert(digest, path.clone()),
            Err(e) => {
                log::warn!("Failed to hash {}: {}", path.display(), e);
                errors.push(e);
            }
        }
    }
    (groups, errors)
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Walker configuration; `walker_config.min_size` is the size threshold.
    pub walker_config: WalkerConfig,
    /// Digest algorithm for the content phase.
    pub algorithm: HashAlgorithm,
    /// Number of threads hashing size buckets concurrently.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Behavior when a file cannot be hashed.
    pub error_policy: HashErrorPolicy,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("walker_config", &self.walker_config)
            .field("algorithm", &self.algorithm)
            .field("io_threads", &self.io_threads)
            .field("error_policy", &self.error_policy)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            walker_config: WalkerConfig::default(),
            algorithm: HashAlgorithm::default(),
            io_threads: 4,
            error_policy: HashErrorPolicy::default(),
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the size threshold in bytes. Only larger files are considered.
    #[must_use]
    pub fn with_min_size(mut self, bytes: u64) -> Self {
        self.walker_config.min_size = bytes;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the digest algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the number of hashing threads.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the hash error policy.
    #[must_use]
    pub fn with_error_policy(mut self, policy: HashErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Number of roots scanned
    pub roots: usize,
    /// Files larger than the threshold found across all roots
    pub total_files: usize,
    /// Total size of those files in bytes
    pub total_size: u64,
    /// Walk entries skipped because they vanished or were unreadable
    pub skipped_entries: usize,
    /// Distinct file sizes seen
    pub size_buckets: usize,
    /// Files dismissed without hashing because their size was unique
    pub eliminated_by_size: usize,
    /// Files whose content was hashed
    pub files_hashed: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Number of duplicate files (excluding one original per group)
    pub duplicate_files: usize,
    /// Bytes that removing all copies would free
    pub reclaimable_space: u64,
    /// Wall-clock duration of the whole scan
    pub scan_duration: Duration,
    /// Files left out because they could not be hashed (collect policy only)
    pub hash_errors: Vec<HashError>,
}

impl ScanSummary {
    /// Whether some files were left out of the result.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.hash_errors.is_empty()
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize::b(self.reclaimable_space).to_string()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// No root directory was supplied.
    #[error("No directories given to scan")]
    NoRoots,

    /// A root does not exist. Nothing is scanned.
    #[error("{} is not a valid path, please verify", .0.display())]
    InvalidRoot(PathBuf),

    /// A file could not be hashed and the policy is to abort.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// The hashing thread pool could not be created.
    #[error("Failed to build hashing thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Check that every root exists, before any of them is walked.
///
/// # Errors
///
/// [`FinderError::NoRoots`] for an empty list, [`FinderError::InvalidRoot`]
/// naming the first missing root otherwise.
pub fn validate_roots(roots: &[PathBuf]) -> Result<(), FinderError> {
    if roots.is_empty() {
        return Err(FinderError::NoRoots);
    }
    match roots.iter().find(|root| !root.exists()) {
        Some(missing) => Err(FinderError::InvalidRoot(missing.clone())),
        None => Ok(()),
    }
}

/// Per-bucket hashing outcome: bucket size, digest groups, skipped files.
type BucketResult = (u64, DigestGroups, Vec<HashError>);

/// Duplicate finder that orchestrates the two-phase detection pipeline.
///
/// Each call to [`find_duplicates`](Self::find_duplicates) is an independent
/// pass; nothing carries over between calls except the hasher's invocation
/// counter.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = Arc::new(Hasher::new(config.algorithm));
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The hasher used for the content phase.
    #[must_use]
    pub fn hasher(&self) -> &Hasher {
        &self.hasher
    }

    /// Find duplicate files across all given roots.
    ///
    /// # Returns
    ///
    /// A tuple of:
    /// - [`DuplicateSet`] - digest to groups of 2+ identical files
    /// - [`ScanSummary`] - statistics about the scan
    ///
    /// # Errors
    ///
    /// - [`FinderError::InvalidRoot`] if any root does not exist (checked
    ///   before walking anything)
    /// - [`FinderError::Hash`] if a file cannot be hashed under
    ///   [`HashErrorPolicy::Abort`]
    pub fn find_duplicates(
        &self,
        roots: &[PathBuf],
    ) -> Result<(DuplicateSet, ScanSummary), FinderError> {
        let start_time = Instant::now();

        validate_roots(roots)?;

        let mut summary = ScanSummary {
            roots: roots.len(),
            ..Default::default()
        };

        // Phase 1: index every root by size and merge in root order
        let size_groups = self.index_roots(roots, &mut summary);
        summary.size_buckets = size_groups.len();

        let candidates = size_groups.into_multi_member();
        let candidate_files = candidates.path_count();
        summary.eliminated_by_size = summary.total_files - candidate_files;

        log::info!(
            "Phase 1 complete: {} files in {} size buckets, {} share a size",
            summary.total_files,
            summary.size_buckets,
            candidate_files
        );

        // Phase 2: hash only buckets with more than one member
        let (digest_groups, sizes) = self.hash_candidates(candidates, &mut summary)?;

        let duplicates = DuplicateSet::from_digest_groups(digest_groups, &sizes);

        summary.duplicate_groups = duplicates.len();
        summary.duplicate_files = duplicates.duplicate_files();
        summary.reclaimable_space = duplicates.reclaimable_space();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} duplicate files, {} reclaimable",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        Ok((duplicates, summary))
    }

    /// Walk each root and merge the per-root size buckets.
    ///
    /// Roots are walked one after another; each walk is already parallel
    /// inside jwalk.
    fn index_roots(&self, roots: &[PathBuf], summary: &mut ScanSummary) -> SizeGroups {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_WALKING, 0);
        }

        let mut merged = SizeGroups::new();
        for root in roots {
            log::info!("Indexing {}", root.display());
            if let Some(ref callback) = self.config.progress_callback {
                callback.on_message(&format!("Indexing {}", root.display()));
            }

            let mut walker = Walker::new(root, self.config.walker_config.clone());
            if let Some(ref callback) = self.config.progress_callback {
                walker = walker.with_progress_callback(Arc::clone(callback));
            }

            let index = walker.index_by_size();
            summary.total_files += index.files;
            summary.total_size += index.bytes;
            summary.skipped_entries += index.skipped;
            merged = merged.merge(index.groups);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_WALKING);
        }

        merged
    }

    /// Hash every candidate bucket and merge the digest groups in bucket order.
    fn hash_candidates(
        &self,
        candidates: SizeGroups,
        summary: &mut ScanSummary,
    ) -> Result<(DigestGroups, HashMap<Digest, u64>), FinderError> {
        if candidates.is_empty() {
            log::info!("No files share a size, nothing to hash");
            return Ok((DigestGroups::new(), HashMap::new()));
        }

        let buckets: Vec<(u64, Vec<PathBuf>)> = candidates.into_iter().collect();
        let total: usize = buckets.iter().map(|(_, paths)| paths.len()).sum();

        log::info!(
            "Phase 2: hashing {} files in {} size buckets with {}",
            total,
            buckets.len(),
            self.hasher.algorithm()
        );

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_HASHING, total);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads.max(1))
            .build()?;

        let hashed_before = self.hasher.files_hashed();
        let done = AtomicUsize::new(0);
        let on_file = |path: &Path| {
            let current = done.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref callback) = self.config.progress_callback {
                callback.on_progress(current, path.to_string_lossy().as_ref());
            }
        };

        let results: Result<Vec<BucketResult>, HashError> = pool.install(|| {
            buckets
                .par_iter()
                .map(|(size, paths)| {
                    log::debug!("Hashing size bucket {} bytes: {} files", size, paths.len());
                    match self.config.error_policy {
                        HashErrorPolicy::Abort => {
                            group_by_digest_with(paths, &self.hasher, on_file)
                                .map(|groups| (*size, groups, Vec::new()))
                        }
                        HashErrorPolicy::Collect => {
                            let (groups, errors) =
                                group_by_digest_lenient_with(paths, &self.hasher, on_file);
                            Ok((*size, groups, errors))
                        }
                    }
                })
                .collect()
        });

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_HASHING);
        }
        summary.files_hashed = self.hasher.files_hashed() - hashed_before;

        let results = results.inspect_err(|e| log::error!("Aborting scan: {}", e))?;

        let mut merged = DigestGroups::new();
        let mut sizes = HashMap::new();
        for (size, groups, errors) in results {
            for digest in groups.keys() {
                sizes.insert(digest.clone(), size);
            }
            merged = merged.merge(groups);
            summary.hash_errors.extend(errors);
        }

        Ok((merged, sizes))
    }
}
