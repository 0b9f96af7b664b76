//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! [`Hasher`] computes 256-bit BLAKE3 digests of whole file contents with a
//! fixed-size read buffer. [`hash_files`] runs it over a batch of paths and
//! buckets the results into [`HashGroups`].
//!
//! Hashing is best-effort: a file that disappeared, cannot be read because of
//! permissions, or lives on a filesystem that does not support reading it is
//! recorded as an [`ErrorRecord`] and the batch continues. Any other I/O
//! failure aborts the batch.

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::progress::{phase, ProgressCallback};

/// Read buffer size for streaming hashes (64 KiB).
pub const BUFFER_SIZE: usize = 64 * 1024;

/// A 256-bit BLAKE3 content digest.
///
/// Serialized as 64 lower-case hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest([u8; 32]);

impl Digest {
    /// Wrap raw digest bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Digest of an in-memory buffer.
    #[must_use]
    pub fn of(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Lower-case hex form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }

    /// Parse the hex form.
    ///
    /// # Errors
    ///
    /// Returns an error for anything other than 64 hex characters.
    pub fn from_hex(hex: &str) -> Result<Self, String> {
        blake3::Hash::from_hex(hex)
            .map(|h| Self(*h.as_bytes()))
            .map_err(|e| format!("invalid digest '{}': {}", hex, e))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Digest {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.to_hex()
    }
}

/// The closed set of per-file failures that never abort a hashing batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoverableKind {
    /// The file vanished between scanning and hashing.
    NotFound,
    /// The file cannot be read on this filesystem.
    Unsupported,
    /// Reading the file is not permitted.
    PermissionDenied,
}

impl RecoverableKind {
    /// Classify an I/O error kind, `None` if the failure is not recoverable.
    #[must_use]
    pub fn from_io(kind: io::ErrorKind) -> Option<Self> {
        match kind {
            io::ErrorKind::NotFound => Some(Self::NotFound),
            io::ErrorKind::Unsupported => Some(Self::Unsupported),
            io::ErrorKind::PermissionDenied => Some(Self::PermissionDenied),
            _ => None,
        }
    }
}

impl fmt::Display for RecoverableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotFound => "not found",
            Self::Unsupported => "unsupported",
            Self::PermissionDenied => "permission denied",
        })
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// A failure the batch absorbs.
    #[error("{kind}: {path}")]
    Recoverable {
        /// File being hashed
        path: PathBuf,
        /// Failure classification
        kind: RecoverableKind,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Any other I/O failure; aborts the batch.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// File being hashed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl HashError {
    /// Sort an I/O error into the recoverable or fatal bucket.
    #[must_use]
    pub fn classify(path: &Path, source: io::Error) -> Self {
        match RecoverableKind::from_io(source.kind()) {
            Some(kind) => Self::Recoverable {
                path: path.to_path_buf(),
                kind,
                source,
            },
            None => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

/// A file that could not be hashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// The file that was skipped
    pub path: PathBuf,
    /// Why it was skipped
    pub kind: RecoverableKind,
    /// The operating system's message
    pub message: String,
}

/// Files sharing one digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashGroup {
    /// Shared content digest
    pub digest: Digest,
    /// Files in the order they were hashed
    pub files: Vec<PathBuf>,
}

impl HashGroup {
    /// Create a group.
    #[must_use]
    pub fn new(digest: Digest, files: Vec<PathBuf>) -> Self {
        Self { digest, files }
    }

    /// Number of files in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Digest-to-files mapping, ordered by first appearance of each digest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashGroups {
    groups: Vec<HashGroup>,
}

impl HashGroups {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over the groups in order.
    pub fn iter(&self) -> std::slice::Iter<'_, HashGroup> {
        self.groups.iter()
    }

    /// Find the group for a digest.
    #[must_use]
    pub fn get(&self, digest: &Digest) -> Option<&HashGroup> {
        self.groups.iter().find(|g| &g.digest == digest)
    }

    /// Total number of files across all groups.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.groups.iter().map(HashGroup::len).sum()
    }

    /// Keep only the groups for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&HashGroup) -> bool) {
        self.groups.retain(keep);
    }

    /// Consume into the ordered group list.
    #[must_use]
    pub fn into_vec(self) -> Vec<HashGroup> {
        self.groups
    }
}

impl FromIterator<(Digest, PathBuf)> for HashGroups {
    fn from_iter<I: IntoIterator<Item = (Digest, PathBuf)>>(iter: I) -> Self {
        let mut index: HashMap<Digest, usize> = HashMap::new();
        let mut groups: Vec<HashGroup> = Vec::new();
        for (digest, path) in iter {
            match index.get(&digest) {
                Some(&i) => groups[i].files.push(path),
                None => {
                    index.insert(digest, groups.len());
                    groups.push(HashGroup::new(digest, vec![path]));
                }
            }
        }
        Self { groups }
    }
}

impl From<Vec<HashGroup>> for HashGroups {
    fn from(groups: Vec<HashGroup>) -> Self {
        Self { groups }
    }
}

impl IntoIterator for HashGroups {
    type Item = HashGroup;
    type IntoIter = std::vec::IntoIter<HashGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl<'a> IntoIterator for &'a HashGroups {
    type Item = &'a HashGroup;
    type IntoIter = std::slice::Iter<'a, HashGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Output of the hashing stage: groups plus skipped files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashOutcome {
    /// Every successfully hashed file, bucketed by digest
    pub groups: HashGroups,
    /// Files skipped with a recoverable error
    pub errors: Vec<ErrorRecord>,
}

/// Streaming BLAKE3 file hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    buffer_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer_size: BUFFER_SIZE,
        }
    }

    /// Create a hasher with a custom buffer size (minimum 1 byte).
    #[must_use]
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }

    /// Hash the full content of a file.
    ///
    /// # Errors
    ///
    /// Returns a classified [`HashError`] if the file cannot be opened or read.
    pub fn full_hash(&self, path: &Path) -> Result<Digest, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::classify(path, e))?;
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.buffer_size];

        loop {
            let n = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::classify(path, e)),
            };
            hasher.update(&buffer[..n]);
        }

        Ok(Digest(*hasher.finalize().as_bytes()))
    }
}

/// Hash every regular file in `files` and group them by digest.
///
/// Directories and special files are skipped. Each path counts as one
/// progress unit whether or not it could be hashed.
///
/// # Errors
///
/// Returns the first I/O error outside [`RecoverableKind`].
pub fn hash_files(
    files: &[PathBuf],
    hasher: &Hasher,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> Result<HashOutcome, HashError> {
    if let Some(cb) = progress {
        cb.on_phase_start(phase::HASH, files.len());
    }

    let mut hashed: Vec<(Digest, PathBuf)> = Vec::with_capacity(files.len());
    let mut errors = Vec::new();

    for (i, path) in files.iter().enumerate() {
        let result = fs::metadata(path)
            .map_err(|e| HashError::classify(path, e))
            .and_then(|meta| {
                if meta.is_file() {
                    hasher.full_hash(path).map(Some)
                } else {
                    log::trace!("Not a regular file, skipping: {}", path.display());
                    Ok(None)
                }
            });

        match result {
            Ok(Some(digest)) => hashed.push((digest, path.clone())),
            Ok(None) => {}
            Err(HashError::Recoverable { path, kind, source }) => {
                log::warn!("Could not hash {} ({})", path.display(), kind);
                errors.push(ErrorRecord {
                    path,
                    kind,
                    message: source.to_string(),
                });
            }
            Err(e) => return Err(e),
        }

        if let Some(cb) = progress {
            cb.on_progress(i + 1, &path.to_string_lossy());
        }
    }

    if let Some(cb) = progress {
        cb.on_phase_end(phase::HASH);
    }

    let groups: HashGroups = hashed.into_iter().collect();
    log::info!(
        "Hashed {} file(s) into {} group(s), {} error(s)",
        groups.file_count(),
        groups.len(),
        errors.len()
    );

    Ok(HashOutcome { groups, errors })
}
