use dupfind::duplicates::{DuplicateFinder, FinderConfig};
use dupfind::scanner::{HashAlgorithm, Hasher, WalkerConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tempfile::tempdir;

fn write_file(path: &std::path::Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

#[test]
fn test_identical_files_form_one_group() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"hello");
    write_file(&dir.path().join("b.txt"), b"hello");

    let finder = DuplicateFinder::new(FinderConfig::default().with_min_size(0));
    let (set, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(set.len(), 1);
    let hello = Hasher::default().digest_bytes(b"hello");
    let group = set.get(&hello).unwrap();
    assert_eq!(
        group.paths,
        vec![dir.path().join("a.txt"), dir.path().join("b.txt")]
    );
    assert_eq!(group.size, 5);
    assert_eq!(summary.duplicate_groups, 1);
}

#[test]
fn test_same_size_different_content_is_not_duplicate() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"hello");
    write_file(&dir.path().join("b.txt"), b"world");

    let finder = DuplicateFinder::new(FinderConfig::default().with_min_size(0));
    let (set, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(set.is_empty());
    // Both shared a size bucket, so both were hashed
    assert_eq!(summary.files_hashed, 2);
}

#[test]
fn test_files_at_or_below_threshold_are_excluded() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"hi");
    write_file(&dir.path().join("b.txt"), b"hi");

    let finder = DuplicateFinder::new(FinderConfig::default().with_min_size(1024 * 1024));
    let (set, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(set.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.files_hashed, 0);
}

#[test]
fn test_threshold_is_strict() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("at1.bin"), &[1u8; 100]);
    write_file(&dir.path().join("at2.bin"), &[1u8; 100]);
    write_file(&dir.path().join("over1.bin"), &[2u8; 101]);
    write_file(&dir.path().join("over2.bin"), &[2u8; 101]);

    let finder = DuplicateFinder::new(FinderConfig::default().with_min_size(100));
    let (set, _) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(set.len(), 1);
    let group = set.iter().next().unwrap();
    assert_eq!(group.size, 101);
    assert!(group.contains(&dir.path().join("over1.bin")));
    assert!(!group.contains(&dir.path().join("at1.bin")));
}

#[test]
fn test_unique_sizes_are_never_hashed() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("one.bin"), &[0u8; 10]);
    write_file(&dir.path().join("two.bin"), &[0u8; 20]);
    write_file(&dir.path().join("three.bin"), &[0u8; 30]);
    write_file(&dir.path().join("pair1.bin"), &[9u8; 40]);
    write_file(&dir.path().join("pair2.bin"), &[9u8; 40]);

    let finder = DuplicateFinder::new(FinderConfig::default());
    let (set, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(summary.total_files, 5);
    assert_eq!(summary.eliminated_by_size, 3);
    assert_eq!(summary.files_hashed, 2);
    assert_eq!(finder.hasher().files_hashed(), 2);
}

#[test]
fn test_nested_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("subdir");
    let deeper = sub.join("deeper");
    fs::create_dir_all(&deeper).unwrap();

    write_file(&dir.path().join("a.txt"), b"nested content");
    write_file(&deeper.join("b.txt"), b"nested content");

    let finder = DuplicateFinder::with_defaults();
    let (set, _) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(set.len(), 1);
    let group = set.iter().next().unwrap();
    assert!(group.contains(&deeper.join("b.txt")));
}

#[test]
fn test_three_copies_and_two_groups() {
    let dir = tempdir().unwrap();
    for name in ["x1", "x2", "x3"] {
        write_file(&dir.path().join(name), b"xxxxxxxx");
    }
    for name in ["y1", "y2"] {
        write_file(&dir.path().join(name), b"yyyyyyyyyyyy");
    }

    let finder = DuplicateFinder::with_defaults();
    let (set, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(set.len(), 2);
    assert_eq!(summary.duplicate_files, 3);
    assert_eq!(summary.reclaimable_space, 2 * 8 + 12);

    let sorted = set.sorted_by_size();
    assert_eq!(sorted[0].size, 12);
    assert_eq!(sorted[1].len(), 3);
}

#[test]
fn test_blake3_finds_same_groups_as_md5() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a"), b"same bytes");
    write_file(&dir.path().join("b"), b"same bytes");
    write_file(&dir.path().join("c"), b"diff bytes");

    let roots = [dir.path().to_path_buf()];
    let (md5_set, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&roots)
        .unwrap();
    let (blake3_set, _) =
        DuplicateFinder::new(FinderConfig::default().with_algorithm(HashAlgorithm::Blake3))
            .find_duplicates(&roots)
            .unwrap();

    let md5_paths: Vec<Vec<PathBuf>> = md5_set.iter().map(|g| g.paths.clone()).collect();
    let blake3_paths: Vec<Vec<PathBuf>> = blake3_set.iter().map(|g| g.paths.clone()).collect();
    assert_eq!(md5_paths, blake3_paths);
    assert_eq!(
        blake3_set.iter().next().unwrap().digest.as_bytes().len(),
        32
    );
}

#[test]
fn test_skip_hidden_and_ignore_patterns() {
    let dir = tempdir().unwrap();
    let hidden = dir.path().join(".cache");
    let build = dir.path().join("build");
    fs::create_dir(&hidden).unwrap();
    fs::create_dir(&build).unwrap();

    write_file(&dir.path().join("keep.txt"), b"payload");
    write_file(&hidden.join("copy.txt"), b"payload");
    write_file(&build.join("copy.txt"), b"payload");
    write_file(&dir.path().join("copy.tmp"), b"payload");

    let walker_config = WalkerConfig::default()
        .skip_hidden(true)
        .ignore_patterns(vec!["build/".to_string(), "*.tmp".to_string()]);
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config));
    let (set, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(set.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_idempotent_runs() {
    let dir = tempdir().unwrap();
    for i in 0..6 {
        write_file(&dir.path().join(format!("f{i}")), &[(i % 3) as u8; 64]);
    }

    let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(3));
    let roots = [dir.path().to_path_buf()];
    let (first, _) = finder.find_duplicates(&roots).unwrap();
    let (second, _) = finder.find_duplicates(&roots).unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[cfg(unix)]
#[test]
fn test_symlinks_not_followed_by_default() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("target.bin");
    write_file(&target, b"linked content");
    std::os::unix::fs::symlink(&target, dir.path().join("link.bin")).unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (set, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(set.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[cfg(unix)]
#[test]
fn test_unreadable_walk_entry_is_skipped_and_scan_continues() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"hello");
    write_file(&dir.path().join("b.txt"), b"hello");
    std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("dangling")).unwrap();

    let walker_config = WalkerConfig::default().follow_symlinks(true);
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config));
    let (set, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(summary.skipped_entries, 1);
    assert_eq!(summary.total_files, 2);
}
