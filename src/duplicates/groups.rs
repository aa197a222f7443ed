//! Grouping structures for duplicate detection.
//!
//! # Overview
//!
//! [`GroupMap`] is the multimap both phases accumulate into: a key (file size
//! in phase 1, content digest in phase 2) mapped to the ordered paths seen
//! with it. Maps are combined with [`GroupMap::merge`], which consumes both
//! sides and returns the union with per-key concatenation. Nothing is merged
//! in place behind a shared reference, so partial maps built on different
//! threads can be combined afterwards.
//!
//! [`DuplicateSet`] is the final result: only digests shared by two or more
//! paths survive.
//!
//! # Example
//!
//! ```
//! use dupfind::duplicates::SizeGroups;
//! use std::path::PathBuf;
//!
//! let mut first = SizeGroups::new();
//! first.insert(100, PathBuf::from("/a/x.txt"));
//!
//! let mut second = SizeGroups::new();
//! second.insert(100, PathBuf::from("/b/y.txt"));
//! second.insert(200, PathBuf::from("/b/z.txt"));
//!
//! let merged = first.merge(second);
//! assert_eq!(merged.get(&100).unwrap().len(), 2);
//!
//! // Only buckets with 2+ paths can hold duplicates
//! let candidates = merged.into_multi_member();
//! assert_eq!(candidates.len(), 1);
//! ```

use std::collections::btree_map::{self, BTreeMap};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::scanner::Digest;

/// Ordered multimap from a grouping key to the paths that share it.
///
/// Keys iterate in ascending order; paths within a key keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMap<K: Ord> {
    groups: BTreeMap<K, Vec<PathBuf>>,
}

/// Paths grouped by exact file size in bytes.
pub type SizeGroups = GroupMap<u64>;

/// Paths grouped by content digest.
pub type DigestGroups = GroupMap<Digest>;

impl<K: Ord> Default for GroupMap<K> {
    fn default() -> Self {
        Self {
            groups: BTreeMap::new(),
        }
    }
}

impl<K: Ord> GroupMap<K> {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` to the bucket for `key`, creating the bucket if needed.
    pub fn insert(&mut self, key: K, path: PathBuf) {
        self.groups.entry(key).or_default().push(path);
    }

    /// Combine two maps.
    ///
    /// For every key the paths of `self` come first, followed by the paths
    /// of `other`. The operation is associative.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for (key, mut paths) in other.groups {
            match self.groups.entry(key) {
                btree_map::Entry::Occupied(mut entry) => entry.get_mut().append(&mut paths),
                btree_map::Entry::Vacant(entry) => {
                    entry.insert(paths);
                }
            }
        }
        self
    }

    /// Keep only buckets with more than one path.
    #[must_use]
    pub fn into_multi_member(mut self) -> Self {
        self.groups.retain(|_, paths| paths.len() > 1);
        self
    }

    /// Paths recorded for `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&[PathBuf]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    /// Number of buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the map has no buckets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of paths across all buckets.
    #[must_use]
    pub fn path_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Number of buckets holding more than one path.
    #[must_use]
    pub fn multi_member_count(&self) -> usize {
        self.groups.values().filter(|paths| paths.len() > 1).count()
    }

    /// Iterate over buckets in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[PathBuf])> {
        self.groups.iter().map(|(key, paths)| (key, paths.as_slice()))
    }

    /// Iterate over the keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.groups.keys()
    }
}

impl<K: Ord> IntoIterator for GroupMap<K> {
    type Item = (K, Vec<PathBuf>);
    type IntoIter = btree_map::IntoIter<K, Vec<PathBuf>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl<K: Ord> FromIterator<(K, PathBuf)> for GroupMap<K> {
    fn from_iter<I: IntoIterator<Item = (K, PathBuf)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord> Extend<(K, PathBuf)> for GroupMap<K> {
    fn extend<I: IntoIterator<Item = (K, PathBuf)>>(&mut self, iter: I) {
        for (key, path) in iter {
            self.insert(key, path);
        }
    }
}

/// Confirmed group of files with identical content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Content digest shared by every file in the group
    pub digest: Digest,
    /// File size in bytes (shared by all files)
    pub size: u64,
    /// Paths of the identical files, at least two
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(digest: Digest, size: u64, paths: Vec<PathBuf>) -> Self {
        Self { digest, size, paths }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.paths.len() as u64
    }

    /// Space taken by the copies beyond the first.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Whether `path` belongs to this group.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }
}

/// Final result of a scan: digest to group, for digests with 2+ paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateSet {
    groups: BTreeMap<Digest, DuplicateGroup>,
}

impl DuplicateSet {
    /// Build the set from merged digest groups.
    ///
    /// Digests with a single path are dropped. `sizes` maps each digest to
    /// the size bucket it was computed in; a missing entry yields size 0.
    #[must_use]
    pub fn from_digest_groups(groups: DigestGroups, sizes: &HashMap<Digest, u64>) -> Self {
        let groups = groups
            .into_multi_member()
            .into_iter()
            .map(|(digest, paths)| {
                let size = sizes.get(&digest).copied().unwrap_or_default();
                log::debug!(
                    "Duplicate group {}: {} files, {} bytes each",
                    digest,
                    paths.len(),
                    size
                );
                (digest.clone(), DuplicateGroup::new(digest, size, paths))
            })
            .collect();

        Self { groups }
    }

    /// Whether no duplicates were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of duplicate groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Group for a digest.
    #[must_use]
    pub fn get(&self, digest: &Digest) -> Option<&DuplicateGroup> {
        self.groups.get(digest)
    }

    /// Iterate over groups in digest order.
    pub fn iter(&self) -> impl Iterator<Item = &DuplicateGroup> {
        self.groups.values()
    }

    /// Groups ordered for display: largest files first, then by digest.
    #[must_use]
    pub fn sorted_by_size(&self) -> Vec<&DuplicateGroup> {
        let mut groups: Vec<_> = self.groups.values().collect();
        groups.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.digest.cmp(&b.digest)));
        groups
    }

    /// Number of files that are copies of another (excluding one original per group).
    #[must_use]
    pub fn duplicate_files(&self) -> usize {
        self.groups.values().map(DuplicateGroup::duplicate_count).sum()
    }

    /// Bytes that removing all copies would free.
    #[must_use]
    pub fn reclaimable_space(&self) -> u64 {
        self.groups.values().map(DuplicateGroup::wasted_space).sum()
    }
}
