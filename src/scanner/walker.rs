//! Directory walker and size indexer built on jwalk.
//!
//! # Overview
//!
//! [`Walker`] traverses one root directory and yields a [`FileRecord`] for
//! every regular file larger than the configured threshold.
//! [`Walker::index_by_size`] folds those records into per-size buckets,
//! the first and cheapest phase of duplicate detection.
//!
//! # Features
//!
//! - Parallel directory reading via jwalk, children sorted by name
//! - Strict size threshold (`size > min_size`)
//! - Symlinks are neither recorded nor followed unless configured
//! - Gitignore-style pattern matching via the `ignore` crate
//! - Entries that vanish or cannot be read mid-walk are skipped, never fatal
//!
//! # Example
//!
//! ```no_run
//! use dupfind::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::with_min_size(1024));
//! let index = walker.index_by_size();
//! println!("{} files in {} size buckets", index.files, index.groups.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use jwalk::WalkDir;

use super::{FileRecord, ScanError, WalkerConfig};
use crate::duplicates::SizeGroups;
use crate::progress::ProgressCallback;

/// Result of indexing one root by file size.
#[derive(Debug, Default)]
pub struct SizeIndex {
    /// Paths grouped by exact size
    pub groups: SizeGroups,
    /// Number of files recorded
    pub files: usize,
    /// Total bytes of recorded files
    pub bytes: u64,
    /// Entries skipped because they vanished or could not be read
    pub skipped: usize,
}

/// Directory walker for one root.
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional progress callback, ticked once per recorded file
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("config", &self.config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Walker {
    /// Create a new walker for the given root.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Build the ignore matcher from the configured patterns.
    fn build_gitignore(&self) -> Option<Gitignore> {
        if self.config.ignore_patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(&self.root);
        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if !gitignore.is_empty() => Some(gitignore),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Walk the directory tree, yielding recorded files.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. Directories, symlinks and files at or below the size
    /// threshold produce no item at all.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        let gitignore = self.build_gitignore();
        let root = self.root.clone();

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(self.config.skip_hidden)
            .process_read_dir(move |_depth, _path, _read_dir_state, children| {
                // Dropping an ignored directory here also prunes its subtree
                if let Some(ref gi) = gitignore {
                    children.retain(|child| match child {
                        Ok(entry) => {
                            let path = entry.path();
                            let relative = path.strip_prefix(&root).unwrap_or(path.as_path());
                            !gi.matched(relative, entry.file_type().is_dir()).is_ignore()
                        }
                        Err(_) => true,
                    });
                }

                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir
            .into_iter()
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    // The root itself is never a candidate
                    if entry.depth == 0 {
                        return None;
                    }

                    let file_type = entry.file_type();
                    if file_type.is_dir() {
                        return None;
                    }

                    if file_type.is_symlink() && !self.config.follow_symlinks {
                        log::trace!("Skipping symlink: {}", path.display());
                        return None;
                    }

                    let metadata = if self.config.follow_symlinks {
                        std::fs::metadata(&path)
                    } else {
                        std::fs::symlink_metadata(&path)
                    };

                    let metadata = match metadata {
                        Ok(m) => m,
                        Err(e) => return Some(Err(self.handle_io_error(&path, e))),
                    };

                    if !metadata.is_file() {
                        return None;
                    }

                    self.process_file(path, metadata.len())
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    Some(Err(self.handle_jwalk_error(path, e)))
                }
            })
    }

    /// Apply the size threshold to a regular file.
    fn process_file(&self, path: PathBuf, size: u64) -> Option<Result<FileRecord, ScanError>> {
        if size <= self.config.min_size {
            log::trace!(
                "Skipping file at or below threshold ({} <= {}): {}",
                size,
                self.config.min_size,
                path.display()
            );
            return None;
        }

        Some(Ok(FileRecord::new(path, size)))
    }

    /// Walk the tree and group recorded files by size.
    ///
    /// Walk errors are logged and counted in [`SizeIndex::skipped`]; they
    /// never abort indexing.
    #[must_use]
    pub fn index_by_size(&self) -> SizeIndex {
        let mut index = SizeIndex::default();

        for result in self.walk() {
            match result {
                Ok(file) => {
                    index.files += 1;
                    index.bytes += file.size;
                    if let Some(ref callback) = self.progress_callback {
                        callback.on_progress(index.files, file.path.to_string_lossy().as_ref());
                    }
                    index.groups.insert(file.size, file.path);
                }
                Err(e) => {
                    log::debug!("Skipping entry: {}", e);
                    index.skipped += 1;
                }
            }
        }

        log::debug!(
            "Indexed {}: {} files in {} size buckets, {} skipped",
            self.root.display(),
            index.files,
            index.groups.len(),
            index.skipped
        );

        index
    }

    /// Classify and log an I/O error during stat.
    fn handle_io_error(&self, path: &Path, error: std::io::Error) -> ScanError {
        let error = ScanError::from_io(path, error);
        match error {
            ScanError::NotFound(_) => {
                log::debug!("File not found (may have been deleted): {}", path.display());
            }
            _ => log::warn!("{}", error),
        }
        error
    }

    /// Handle jwalk errors.
    fn handle_jwalk_error(&self, path: PathBuf, error: jwalk::Error) -> ScanError {
        log::warn!("Walker error for {}: {}", path.display(), error);
        match error.io_error().map(std::io::Error::kind) {
            Some(std::io::ErrorKind::PermissionDenied) => ScanError::PermissionDenied(path),
            Some(std::io::ErrorKind::NotFound) => ScanError::NotFound(path),
            _ => ScanError::Io {
                path,
                source: std::io::Error::other(error.to_string()),
            },
        }
    }
}
