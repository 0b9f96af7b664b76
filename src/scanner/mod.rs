//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Deterministic directory walking using walkdir
//! - Exclusion filtering with regex patterns
//! - Content hashing with BLAKE3, tolerant of per-file failures
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`exclusion`]: The exclusion list loaded from the working directory
//! - [`hasher`]: BLAKE3 file hashing (streaming) and hash grouping
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::{ExclusionList, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let exclusions = ExclusionList::new(["node_modules", r"\.tmp$"]);
//! let walker = Walker::new(Path::new("."), WalkerConfig::default(), exclusions);
//! let files = walker.scan().unwrap();
//! println!("Found {} files", files.len());
//! ```

pub mod exclusion;
pub mod hasher;
pub mod walker;

use std::path::PathBuf;

pub use exclusion::ExclusionList;
pub use hasher::{
    hash_files, Digest, ErrorRecord, HashError, HashGroup, HashGroups, HashOutcome, Hasher,
    RecoverableKind,
};
pub use walker::Walker;

/// Which entries the walker descends into and emits.
///
/// Both options are off by default: dot-entries below the root are skipped
/// and symlinks are reported as entries rather than traversed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Traverse symlinked directories and hash link targets in place.
    pub follow_symlinks: bool,
    /// Emit entries whose name starts with `.`.
    pub include_hidden: bool,
}

impl WalkerConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(follow_symlinks: bool, include_hidden: bool) -> Self {
        Self {
            follow_symlinks,
            include_hidden,
        }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The scan root was not found.
    #[error("Scan root does not exist: {0}")]
    NotFound(PathBuf),

    /// The scan root is not a directory.
    #[error("Scan root is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The scan root or the exclusion list could not be read.
    #[error("Cannot read {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
