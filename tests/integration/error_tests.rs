use dupfind::duplicates::{DuplicateFinder, FinderConfig, FinderError, HashErrorPolicy};
use dupfind::error::ExitCode;
use dupfind::progress::{ProgressCallback, PHASE_HASHING};
use dupfind::scanner::HashError;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

/// Deletes a file as soon as hashing starts, so it vanishes after the walk.
struct VanishOnHash {
    victim: Mutex<Option<PathBuf>>,
}

impl VanishOnHash {
    fn new(victim: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            victim: Mutex::new(Some(victim)),
        })
    }
}

impl ProgressCallback for VanishOnHash {
    fn on_phase_start(&self, phase: &str, _total: usize) {
        if phase == PHASE_HASHING {
            if let Some(path) = self.victim.lock().unwrap().take() {
                fs::remove_file(path).unwrap();
            }
        }
    }

    fn on_progress(&self, _current: usize, _path: &str) {}

    fn on_phase_end(&self, _phase: &str) {}
}

#[derive(Default)]
struct CountingCallback {
    phases: AtomicUsize,
    files: AtomicUsize,
}

impl ProgressCallback for CountingCallback {
    fn on_phase_start(&self, _phase: &str, _total: usize) {
        self.phases.fetch_add(1, Ordering::SeqCst);
    }

    fn on_progress(&self, _current: usize, _path: &str) {
        self.files.fetch_add(1, Ordering::SeqCst);
    }

    fn on_phase_end(&self, _phase: &str) {}
}

#[test]
fn test_nonexistent_root_fails_before_scanning() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"dup").unwrap();
    fs::write(dir.path().join("b"), b"dup").unwrap();
    let missing = dir.path().join("does-not-exist");

    let finder = DuplicateFinder::with_defaults();
    let result = finder.find_duplicates(&[dir.path().to_path_buf(), missing.clone()]);

    match result {
        Err(FinderError::InvalidRoot(path)) => assert_eq!(path, missing),
        other => panic!("Expected InvalidRoot, got {:?}", other.map(|(s, _)| s.len())),
    }
    // The valid root was not touched either
    assert_eq!(finder.hasher().files_hashed(), 0);
}

#[test]
fn test_invalid_root_exit_code_and_message() {
    let finder = DuplicateFinder::with_defaults();
    let err = finder
        .find_duplicates(&[PathBuf::from("/no/such/place")])
        .unwrap_err();

    assert_eq!(err.to_string(), "/no/such/place is not a valid path, please verify");
    assert_eq!(
        ExitCode::for_error(&anyhow::Error::new(err)),
        ExitCode::InvalidPath
    );
}

#[test]
fn test_empty_root_list() {
    let finder = DuplicateFinder::with_defaults();
    assert!(matches!(
        finder.find_duplicates(&[]),
        Err(FinderError::NoRoots)
    ));
}

#[test]
fn test_file_vanishing_before_hash_aborts_by_default() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.bin");
    let b = dir.path().join("b.bin");
    fs::write(&a, b"same size").unwrap();
    fs::write(&b, b"same size").unwrap();

    let config = FinderConfig::default().with_progress_callback(VanishOnHash::new(b.clone()));
    let finder = DuplicateFinder::new(config);

    match finder.find_duplicates(&[dir.path().to_path_buf()]) {
        Err(FinderError::Hash(HashError::NotFound(path))) => assert_eq!(path, b),
        other => panic!("Expected hash NotFound, got {:?}", other.map(|(s, _)| s.len())),
    }
}

#[test]
fn test_file_vanishing_before_hash_is_collected_with_keep_going() {
    let dir = tempdir().unwrap();
    for name in ["a.bin", "b.bin", "c.bin"] {
        fs::write(dir.path().join(name), b"same size").unwrap();
    }
    let victim = dir.path().join("c.bin");

    let config = FinderConfig::default()
        .with_error_policy(HashErrorPolicy::Collect)
        .with_progress_callback(VanishOnHash::new(victim.clone()));
    let finder = DuplicateFinder::new(config);

    let (set, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(summary.is_partial());
    assert_eq!(summary.hash_errors.len(), 1);
    assert_eq!(summary.hash_errors[0].path(), victim.as_path());
    assert_eq!(set.len(), 1);
    assert_eq!(
        set.iter().next().unwrap().paths,
        vec![dir.path().join("a.bin"), dir.path().join("b.bin")]
    );
}

#[test]
fn test_progress_callback_sees_both_phases() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"1234").unwrap();
    fs::write(dir.path().join("b"), b"1234").unwrap();
    fs::write(dir.path().join("c"), b"12345").unwrap();

    let callback = Arc::new(CountingCallback::default());
    let config = FinderConfig::default().with_progress_callback(callback.clone());
    DuplicateFinder::new(config)
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(callback.phases.load(Ordering::SeqCst), 2);
    // Three files walked, two hashed
    assert_eq!(callback.files.load(Ordering::SeqCst), 5);
}
