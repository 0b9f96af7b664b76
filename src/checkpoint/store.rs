//! JSON-on-disk checkpoint store.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{Checkpoint, CheckpointError, CheckpointResult, CheckpointStore};

/// Current version of the checkpoint file format.
pub const CHECKPOINT_VERSION: u32 = 1;

/// Envelope for checkpoint files to include integrity checks.
#[derive(Debug, Serialize, Deserialize)]
struct CheckpointEnvelope {
    /// Format version.
    version: u32,
    /// When the checkpoint was written.
    created_at: DateTime<Utc>,
    /// SHA256 checksum of the compact JSON form of `data`.
    checksum: String,
    /// The stage output.
    data: serde_json::Value,
}

/// Checkpoint store keeping one pretty-printed JSON file per checkpoint.
#[derive(Debug, Clone)]
pub struct JsonCheckpointStore {
    dir: PathBuf,
}

impl JsonCheckpointStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the checkpoint files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a checkpoint file.
    #[must_use]
    pub fn path_for(&self, name: Checkpoint) -> PathBuf {
        self.dir.join(name.file_name())
    }

    fn io_error(path: &Path, source: io::Error) -> CheckpointError {
        CheckpointError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn checksum(data: &serde_json::Value) -> Result<String, serde_json::Error> {
    let compact = serde_json::to_string(data)?;
    let mut hasher = Sha256::new();
    hasher.update(compact.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

impl CheckpointStore for JsonCheckpointStore {
    fn read<T: DeserializeOwned>(&self, name: Checkpoint) -> CheckpointResult<T> {
        let path = self.path_for(name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CheckpointError::NotFound(name));
            }
            Err(e) => return Err(Self::io_error(&path, e)),
        };

        let envelope: CheckpointEnvelope =
            serde_json::from_str(&content).map_err(|e| CheckpointError::Corrupt {
                name,
                reason: format!("unparsable envelope: {e}"),
            })?;

        if envelope.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::Version {
                name,
                found: envelope.version,
                expected: CHECKPOINT_VERSION,
            });
        }

        let calculated = checksum(&envelope.data)
            .map_err(|source| CheckpointError::Serialize { name, source })?;
        if calculated != envelope.checksum {
            return Err(CheckpointError::Corrupt {
                name,
                reason: "checksum mismatch".to_string(),
            });
        }

        log::debug!(
            "Loaded checkpoint {} written at {}",
            name,
            envelope.created_at.to_rfc3339()
        );

        serde_json::from_value(envelope.data).map_err(|e| CheckpointError::Corrupt {
            name,
            reason: format!("unexpected shape: {e}"),
        })
    }

    fn write<T: Serialize>(&self, name: Checkpoint, value: &T) -> CheckpointResult<()> {
        let data =
            serde_json::to_value(value).map_err(|source| CheckpointError::Serialize { name, source })?;
        let envelope = CheckpointEnvelope {
            version: CHECKPOINT_VERSION,
            created_at: Utc::now(),
            checksum: checksum(&data).map_err(|source| CheckpointError::Serialize { name, source })?,
            data,
        };
        let json = serde_json::to_string_pretty(&envelope)
            .map_err(|source| CheckpointError::Serialize { name, source })?;

        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(&self.dir, e))?;

        let path = self.path_for(name);
        let tmp_path = self.dir.join(format!("{}.tmp", name.file_name()));
        {
            let mut file = File::create(&tmp_path).map_err(|e| Self::io_error(&tmp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| Self::io_error(&tmp_path, e))?;
            file.sync_all().map_err(|e| Self::io_error(&tmp_path, e))?;
        }
        fs::rename(&tmp_path, &path).map_err(|e| Self::io_error(&path, e))?;

        log::debug!("Saved checkpoint {} to {}", name, path.display());
        Ok(())
    }

    fn exists(&self, name: Checkpoint) -> bool {
        self.path_for(name).is_file()
    }

    fn remove(&self, name: Checkpoint) -> CheckpointResult<()> {
        let path = self.path_for(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }
}
