//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory tree
//! and collecting candidate file paths for hashing. Traversal is
//! single-threaded and children are visited in file-name order, so the same
//! tree always yields the same sequence.
//!
//! Unreadable subdirectories are not an error: their contents are simply
//! missing from the result.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::{ExclusionList, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(
//!     Path::new("/home/user/Downloads"),
//!     WalkerConfig::default(),
//!     ExclusionList::default(),
//! );
//! for path in walker.scan().unwrap() {
//!     println!("{}", path.display());
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use super::{ExclusionList, ScanError, WalkerConfig};
use crate::progress::{phase, ProgressCallback};

/// Directory walker for file discovery.
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Patterns removing paths from the result
    exclusions: ExclusionList,
    /// Optional progress callback
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("exclusions", &self.exclusions)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `config` - Walker configuration options
    /// * `exclusions` - Paths matching any of these patterns are dropped
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig, exclusions: ExclusionList) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            exclusions,
            progress: None,
        }
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Whether a directory entry is hidden (name starts with `.`).
    ///
    /// The root itself is never treated as hidden, so `.` can be scanned.
    fn is_hidden(entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with('.'))
    }

    fn check_root(&self) -> Result<(), ScanError> {
        match fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(ScanError::NotADirectory(self.root.clone())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ScanError::NotFound(self.root.clone()))
            }
            Err(e) => Err(ScanError::Io {
                path: self.root.clone(),
                source: e,
            }),
        }
    }

    /// `path` as seen from inside the root (`./photos/a.jpg`), so exclusion
    /// patterns never match the root's own location.
    fn relative_to_root(&self, path: &Path) -> PathBuf {
        match path.strip_prefix(&self.root) {
            Ok(rel) => Path::new(".").join(rel),
            Err(_) => path.to_path_buf(),
        }
    }

    /// Walk the directory tree and return every non-directory entry that
    /// survives the hidden-file and exclusion filters.
    ///
    /// # Errors
    ///
    /// Fails only if the root itself is missing or not a directory.
    pub fn scan(&self) -> Result<Vec<PathBuf>, ScanError> {
        self.check_root()?;

        if let Some(cb) = &self.progress {
            cb.on_phase_start(phase::SCAN, 0);
        }

        let include_hidden = self.config.include_hidden;
        let walk = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| include_hidden || !Self::is_hidden(entry));

        let mut files = Vec::new();
        for entry in walk {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.into_path();
            if path.to_str().is_none() {
                log::warn!("Skipping path that is not valid UTF-8: {}", path.display());
                continue;
            }

            if self.exclusions.is_excluded(&self.relative_to_root(&path)) {
                log::trace!("Excluded: {}", path.display());
                continue;
            }

            files.push(path);
            if let Some(cb) = &self.progress {
                cb.on_progress(files.len(), "");
            }
        }

        if let Some(cb) = &self.progress {
            cb.on_phase_end(phase::SCAN);
        }

        log::info!("Found {} file(s) under {}", files.len(), self.root.display());
        Ok(files)
    }
}
