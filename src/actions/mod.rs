//! File actions module.
//!
//! This module provides the side effects the resolver triggers:
//! - Moving a discarded duplicate into a trash directory (default `~/.trash`)
//! - Moving it to the platform recycle bin instead (`--system-trash`)
//! - Opening a file with the platform's default application
//!
//! The resolver only sees the [`FileActions`] trait, so tests can record
//! actions instead of touching the desktop.
//!
//! ```no_run
//! use dupsweep::actions::{FileActions, SystemActions, TrashTarget};
//! use std::path::{Path, PathBuf};
//!
//! let actions = SystemActions::new(TrashTarget::Directory(PathBuf::from("/home/me/.trash")));
//! actions.trash(Path::new("./copy of photo.jpg")).unwrap();
//! ```

pub mod discard;
pub mod open;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use discard::{move_to_trash_dir, TrashTarget};
pub use open::open_file;

/// Error type for file actions.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Moving a file into the trash directory failed.
    #[error("failed to move {path} to {target}: {source}")]
    Move {
        /// File being discarded
        path: PathBuf,
        /// Destination path inside the trash directory
        target: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The platform recycle bin refused the file.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed {
        /// File being discarded
        path: PathBuf,
        /// Error reported by the recycle bin
        message: String,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Side-effecting operations on files chosen by the operator.
pub trait FileActions {
    /// Open a file with the default application. Best-effort.
    fn open(&self, path: &Path);

    /// Move a file out of the way. Only called for paths that exist.
    ///
    /// # Errors
    ///
    /// Any failure is fatal to the resolution run.
    fn trash(&self, path: &Path) -> Result<(), ActionError>;
}

/// Real file actions backed by the operating system.
#[derive(Debug, Clone)]
pub struct SystemActions {
    target: TrashTarget,
}

impl SystemActions {
    /// Create actions discarding files into `target`.
    #[must_use]
    pub fn new(target: TrashTarget) -> Self {
        Self { target }
    }
}

impl FileActions for SystemActions {
    fn open(&self, path: &Path) {
        open_file(path);
    }

    fn trash(&self, path: &Path) -> Result<(), ActionError> {
        match &self.target {
            TrashTarget::Directory(dir) => move_to_trash_dir(path, dir).map(|dest| {
                log::info!("Moved {} to {}", path.display(), dest.display());
            }),
            TrashTarget::System => {
                trash::delete(path).map_err(|e| ActionError::TrashFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                log::info!("Moved {} to the system trash", path.display());
                Ok(())
            }
        }
    }
}
