//! Checkpoint module for persisting pipeline stage results.
//!
//! Every pipeline stage writes its output to a named checkpoint so that a
//! later run can resume without recomputing finished stages.
//!
//! # Features
//!
//! * **Persistence**: Stage outputs are stored as pretty-printed JSON.
//! * **Integrity**: Each checkpoint is wrapped in an envelope with a SHA256 checksum.
//! * **Atomic replacement**: Writes land in a temporary file that is renamed over the target.
//!
//! # Architecture
//!
//! * [`CheckpointStore`]: The storage contract used by the pipeline driver.
//! * [`store`]: The JSON-on-disk implementation.

pub mod store;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use store::{JsonCheckpointStore, CHECKPOINT_VERSION};

/// Names of the checkpoints produced by the pipeline, in stage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Checkpoint {
    /// Scanned file list.
    Files,
    /// Hash groups plus hashing errors.
    Analyse,
    /// Duplicate groups (singletons removed).
    Dups,
    /// Ranked groups with sizes.
    Sizes,
}

impl Checkpoint {
    /// All checkpoints in pipeline order.
    pub const ALL: [Checkpoint; 4] = [Self::Files, Self::Analyse, Self::Dups, Self::Sizes];

    /// Short name used in logs and progress messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Files => "files",
            Self::Analyse => "analyse",
            Self::Dups => "dups",
            Self::Sizes => "sizes",
        }
    }

    /// File name of the checkpoint inside the working directory.
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.json", self.name())
    }
}

impl std::fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that can occur while reading or writing checkpoints.
#[derive(thiserror::Error, Debug)]
pub enum CheckpointError {
    /// No checkpoint with this name has been written.
    #[error("checkpoint not found: {0}")]
    NotFound(Checkpoint),

    /// The checkpoint file exists but cannot be trusted.
    #[error("checkpoint {name} is corrupted: {reason}")]
    Corrupt {
        /// Checkpoint name
        name: Checkpoint,
        /// Why the checkpoint was rejected
        reason: String,
    },

    /// The checkpoint was written by an incompatible format version.
    #[error("checkpoint {name} has unsupported version {found} (expected {expected})")]
    Version {
        /// Checkpoint name
        name: Checkpoint,
        /// Version found in the file
        found: u32,
        /// Version this build understands
        expected: u32,
    },

    /// Serializing the stage value failed.
    #[error("failed to serialize checkpoint {name}: {source}")]
    Serialize {
        /// Checkpoint name
        name: Checkpoint,
        /// The underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// An I/O error occurred while accessing the checkpoint file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Result type for checkpoint operations.
pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// Storage for named stage snapshots.
///
/// A `write` fully replaces any previous value; readers never observe a
/// partially written checkpoint.
pub trait CheckpointStore {
    /// Read a checkpoint, failing with [`CheckpointError::NotFound`] if absent.
    fn read<T: DeserializeOwned>(&self, name: Checkpoint) -> CheckpointResult<T>;

    /// Replace the checkpoint with `value`.
    fn write<T: Serialize>(&self, name: Checkpoint, value: &T) -> CheckpointResult<()>;

    /// Whether a checkpoint with this name exists.
    fn exists(&self, name: Checkpoint) -> bool;

    /// Delete a checkpoint if present.
    fn remove(&self, name: Checkpoint) -> CheckpointResult<()>;

    /// Delete every checkpoint.
    fn clear(&self) -> CheckpointResult<()> {
        for name in Checkpoint::ALL {
            self.remove(name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_file_names() {
        assert_eq!(Checkpoint::Files.file_name(), "files.json");
        assert_eq!(Checkpoint::Analyse.file_name(), "analyse.json");
        assert_eq!(Checkpoint::Dups.file_name(), "dups.json");
        assert_eq!(Checkpoint::Sizes.file_name(), "sizes.json");
    }

    #[test]
    fn test_checkpoint_order() {
        let names: Vec<_> = Checkpoint::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["files", "analyse", "dups", "sizes"]);
    }

    #[test]
    fn test_checkpoint_error_display() {
        let err = CheckpointError::NotFound(Checkpoint::Dups);
        assert_eq!(err.to_string(), "checkpoint not found: dups");

        let err = CheckpointError::Version {
            name: Checkpoint::Sizes,
            found: 9,
            expected: 1,
        };
        assert_eq!(
            err.to_string(),
            "checkpoint sizes has unsupported version 9 (expected 1)"
        );
    }
}
