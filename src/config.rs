//! Layered application settings.
//!
//! Settings are merged with figment, later layers winning:
//!
//! 1. Built-in defaults ([`Settings::default`])
//! 2. TOML config file (`<config dir>/dupfind/config.toml` or `--config`)
//! 3. Environment variables prefixed with `DUPFIND_` (e.g. `DUPFIND_SIZE_MB=5`)
//! 4. Command-line flags ([`Settings::apply_cli`])
//!
//! # Example config file
//!
//! ```toml
//! size_mb = 10
//! algorithm = "blake3"
//! io_threads = 2
//! skip_hidden = true
//! ignore_patterns = ["*.tmp", "node_modules/"]
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::duplicates::{FinderConfig, HashErrorPolicy};
use crate::scanner::{HashAlgorithm, WalkerConfig};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "DUPFIND_";

/// Errors raised while loading settings.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A config file passed explicitly does not exist.
    #[error("Config file not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// A layer could not be parsed or has a value of the wrong type.
    #[error("Invalid configuration: {0}")]
    Invalid(#[source] Box<figment::Error>),
}

/// Application settings after all layers are merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Size threshold in megabytes; the sign is ignored.
    pub size_mb: i64,
    /// Content digest algorithm.
    pub algorithm: HashAlgorithm,
    /// Number of hashing threads.
    pub io_threads: usize,
    /// Follow symbolic links during the walk.
    pub follow_symlinks: bool,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Gitignore-style patterns to leave out.
    pub ignore_patterns: Vec<String>,
    /// Skip unreadable files instead of aborting.
    pub keep_going: bool,
    /// Draw progress bars on stderr.
    pub progress: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            size_mb: 1,
            algorithm: HashAlgorithm::default(),
            io_threads: 4,
            follow_symlinks: false,
            skip_hidden: false,
            ignore_patterns: Vec::new(),
            keep_going: false,
            progress: true,
        }
    }
}

impl Settings {
    /// Load settings from defaults, config file and environment.
    ///
    /// With `explicit_path` set, that file must exist. Otherwise the
    /// platform default location is used if present.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingFile`] for a missing explicit file,
    /// [`ConfigError::Invalid`] for malformed TOML or bad values.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };

        if let Some(ref path) = path {
            log::debug!("Loading config from {}", path.display());
        }

        Self::figment(path.as_deref())
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// The figment used by [`load`](Self::load), without the CLI layer.
    ///
    /// A missing file at `path` contributes nothing.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Override settings with flags given on the command line.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(size) = cli.size {
            self.size_mb = size;
        }
        if let Some(algorithm) = cli.algorithm {
            self.algorithm = algorithm;
        }
        if let Some(threads) = cli.io_threads {
            self.io_threads = threads;
        }
        if cli.follow_symlinks {
            self.follow_symlinks = true;
        }
        if cli.skip_hidden {
            self.skip_hidden = true;
        }
        if !cli.ignore_patterns.is_empty() {
            self.ignore_patterns.extend(cli.ignore_patterns.iter().cloned());
        }
        if cli.keep_going {
            self.keep_going = true;
        }
        if cli.no_progress || cli.quiet {
            self.progress = false;
        }
    }

    /// Size threshold in bytes: `|size_mb| * 1024 * 1024`.
    ///
    /// Only files strictly larger than this are considered.
    #[must_use]
    pub fn threshold_bytes(&self) -> u64 {
        self.size_mb.unsigned_abs().saturating_mul(BYTES_PER_MB)
    }

    /// Walker configuration derived from these settings.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::with_min_size(self.threshold_bytes())
            .follow_symlinks(self.follow_symlinks)
            .skip_hidden(self.skip_hidden)
            .ignore_patterns(self.ignore_patterns.clone())
    }

    /// Finder configuration derived from these settings, without a progress callback.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        let policy = if self.keep_going {
            HashErrorPolicy::Collect
        } else {
            HashErrorPolicy::Abort
        };

        FinderConfig::default()
            .with_walker_config(self.walker_config())
            .with_algorithm(self.algorithm)
            .with_io_threads(self.io_threads)
            .with_error_policy(policy)
    }
}

/// Default platform-specific config file location, if one can be determined.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dupfind").map(|dirs| dirs.config_dir().join("config.toml"))
}
