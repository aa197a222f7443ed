//! Streaming file hasher.
//!
//! # Overview
//!
//! [`Hasher`] computes a content [`Digest`] for one file by reading it in
//! [`CHUNK_SIZE`] chunks and folding each chunk into a running hash state,
//! so memory use stays bounded regardless of file size.
//!
//! Two algorithms are available: MD5 (the default, fine for non-adversarial
//! deduplication) and BLAKE3.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::scanner::{HashAlgorithm, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new(HashAlgorithm::Md5);
//! let digest = hasher.digest_file(Path::new("photo.jpg")).unwrap();
//! println!("{digest}");
//! ```

use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use md5::{Digest as _, Md5};
use serde::{Deserialize, Serialize, Serializer};

use super::HashError;

/// Read buffer size used when streaming file contents (64 KiB).
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Digest algorithm used to fingerprint file contents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// MD5, 16-byte digests
    #[default]
    Md5,
    /// BLAKE3, 32-byte digests
    Blake3,
}

impl HashAlgorithm {
    /// Digest length in bytes.
    #[must_use]
    pub fn output_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Blake3 => 32,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Md5 => write!(f, "md5"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

/// Fixed-length content fingerprint of one file.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest(Box<[u8]>);

impl Digest {
    /// Wrap raw digest bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.into())
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hexadecimal rendering.
    #[must_use]
    pub fn to_hex(&self) -> String {
        use fmt::Write;

        let mut hex = String::with_capacity(self.0.len() * 2);
        for byte in self.0.iter() {
            let _ = write!(hex, "{byte:02x}");
        }
        hex
    }

    /// Parse a hexadecimal digest.
    ///
    /// Returns `None` if the string has odd length or non-hex characters.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() % 2 != 0 || !hex.bytes().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let bytes = (0..hex.len())
            .step_by(2)
            .map(|i| hex.get(i..i + 2).and_then(|b| u8::from_str_radix(b, 16).ok()))
            .collect::<Option<Vec<u8>>>()?;
        Some(Self(bytes.into_boxed_slice()))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Running hash state for one file.
enum State {
    Md5(Md5),
    Blake3(Box<blake3::Hasher>),
}

impl State {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Md5 => Self::Md5(Md5::new()),
            HashAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, chunk: &[u8]) {
        match self {
            Self::Md5(state) => state.update(chunk),
            Self::Blake3(state) => {
                state.update(chunk);
            }
        }
    }

    fn finalize(self) -> Digest {
        match self {
            Self::Md5(state) => Digest::from_bytes(&state.finalize()),
            Self::Blake3(state) => Digest::from_bytes(state.finalize().as_bytes()),
        }
    }
}

/// Computes content digests for files.
///
/// A `Hasher` is shared across hashing threads; it only holds the algorithm
/// choice and an invocation counter.
#[derive(Debug, Default)]
pub struct Hasher {
    algorithm: HashAlgorithm,
    files_hashed: AtomicUsize,
}

impl Hasher {
    /// Create a hasher for the given algorithm.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            files_hashed: AtomicUsize::new(0),
        }
    }

    /// The algorithm in use.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Number of `digest_file` calls made on this hasher so far,
    /// including calls that failed.
    #[must_use]
    pub fn files_hashed(&self) -> usize {
        self.files_hashed.load(Ordering::Relaxed)
    }

    /// Compute the digest of a file's full contents.
    ///
    /// The file is read in [`CHUNK_SIZE`] chunks. The handle is closed when
    /// this function returns, on success and on error alike.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or fully read.
    pub fn digest_file(&self, path: &Path) -> Result<Digest, HashError> {
        self.files_hashed.fetch_add(1, Ordering::Relaxed);

        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let digest = self
            .digest_reader(file)
            .map_err(|e| HashError::from_io(path, e))?;

        log::trace!("Hashed {}: {}", path.display(), digest);
        Ok(digest)
    }

    /// Compute the digest of everything readable from `reader`.
    ///
    /// # Errors
    ///
    /// Propagates read errors other than `Interrupted`, which is retried.
    pub fn digest_reader<R: Read>(&self, mut reader: R) -> std::io::Result<Digest> {
        let mut state = State::new(self.algorithm);
        let mut buffer = vec![0u8; CHUNK_SIZE];

        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => state.update(&buffer[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(state.finalize())
    }

    /// Compute the digest of an in-memory buffer.
    #[must_use]
    pub fn digest_bytes(&self, data: &[u8]) -> Digest {
        let mut state = State::new(self.algorithm);
        state.update(data);
        state.finalize()
    }
}
