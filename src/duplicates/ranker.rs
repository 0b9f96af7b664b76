//! Size ranking of duplicate groups.
//!
//! # Overview
//!
//! Each duplicate group gets a representative size: the size of the first
//! member still present on disk. Groups whose members have all disappeared
//! get no size. Groups are then ordered largest first; equal sizes keep their
//! original order and sizeless groups go last.
//!
//! The reclaimable total is the space freed by keeping exactly one copy of
//! each group: the sum of `size * (count - 1)`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::progress::{phase, ProgressCallback};
use crate::scanner::{Digest, HashGroups};

/// Errors that can occur while sizing groups.
#[derive(thiserror::Error, Debug)]
pub enum RankError {
    /// Reading file metadata failed for a reason other than the file being gone.
    #[error("failed to read size of {path}: {source}")]
    Io {
        /// File being sized
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// A duplicate group annotated with its representative size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedGroup {
    /// Shared content digest
    pub digest: Digest,
    /// Member files
    pub files: Vec<PathBuf>,
    /// Size of the first member still on disk, `None` if none remain
    pub size: Option<u64>,
}

impl RankedGroup {
    /// Create a ranked group.
    #[must_use]
    pub fn new(digest: Digest, files: Vec<PathBuf>, size: Option<u64>) -> Self {
        Self {
            digest,
            files,
            size,
        }
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

    /// Bytes freed by keeping a single copy.
    #[must_use]
    pub fn reclaimable(&self) -> u64 {
        match self.size {
            Some(size) if self.files.len() > 1 => size * (self.files.len() as u64 - 1),
            _ => 0,
        }
    }
}

/// Ranked duplicate groups, largest first, with the aggregate reclaimable size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedGroups {
    /// Groups in descending size order
    pub groups: Vec<RankedGroup>,
    /// Sum of [`RankedGroup::reclaimable`] over all groups
    pub total_reclaimable: u64,
}

impl RankedGroups {
    /// Sort `groups` by size descending and compute the total.
    #[must_use]
    pub fn from_groups(mut groups: Vec<RankedGroup>) -> Self {
        // Stable: equal sizes keep their input order.
        groups.sort_by(|a, b| b.size.cmp(&a.size));
        let total_reclaimable = groups.iter().map(RankedGroup::reclaimable).sum();
        Self {
            groups,
            total_reclaimable,
        }
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

    /// Total number of files across all groups.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.groups.iter().map(RankedGroup::len).sum()
    }
}

/// Size of the first file in `files` that still exists.
///
/// # Errors
///
/// Metadata failures other than `NotFound` are returned.
pub fn first_present_size(files: &[PathBuf]) -> Result<Option<u64>, RankError> {
    for path in files {
        match file_size(path) {
            Ok(size) => return Ok(Some(size)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("Gone since hashing: {}", path.display());
            }
            Err(source) => {
                return Err(RankError::Io {
                    path: path.clone(),
                    source,
                })
            }
        }
    }
    Ok(None)
}

fn file_size(path: &Path) -> io::Result<u64> {
    fs::metadata(path).map(|m| m.len())
}

/// Size every group against the current disk state, then rank.
///
/// # Errors
///
/// Returns [`RankError`] if a size lookup fails with anything but `NotFound`.
pub fn rank_by_size(
    groups: HashGroups,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> Result<RankedGroups, RankError> {
    if let Some(cb) = progress {
        cb.on_phase_start(phase::SIZE, groups.len());
    }

    let mut sized = Vec::with_capacity(groups.len());
    for (i, group) in groups.into_iter().enumerate() {
        let size = first_present_size(&group.files)?;
        if size.is_none() {
            log::warn!(
                "No file of group {} is still present on disk",
                group.digest
            );
        }
        sized.push(RankedGroup::new(group.digest, group.files, size));
        if let Some(cb) = progress {
            cb.on_progress(i + 1, "");
        }
    }

    if let Some(cb) = progress {
        cb.on_phase_end(phase::SIZE);
    }

    let ranked = RankedGroups::from_groups(sized);
    log::info!(
        "The duplicates consume a total of {} bytes ({})",
        ranked.total_reclaimable,
        bytesize::ByteSize::b(ranked.total_reclaimable)
    );
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::HashGroup;
    use tempfile::tempdir;

    fn ranked(tag: &[u8], count: usize, size: Option<u64>) -> RankedGroup {
        let files = (0..count)
            .map(|i| PathBuf::from(format!("./{}_{}", String::from_utf8_lossy(tag), i)))
            .collect();
        RankedGroup::new(Digest::of(tag), files, size)
    }

    #[test]
    fn test_total_reclaimable() {
        let ranked = RankedGroups::from_groups(vec![
            ranked(b"big", 3, Some(100)),
            ranked(b"small", 2, Some(50)),
        ]);
        assert_eq!(ranked.total_reclaimable, 250);
    }

    #[test]
    fn test_descending_order() {
        let ranked = RankedGroups::from_groups(vec![
            ranked(b"a", 2, Some(10)),
            ranked(b"b", 2, Some(500)),
            ranked(b"c", 2, Some(50)),
        ]);
        let sizes: Vec<_> = ranked.groups.iter().map(|g| g.size).collect();
        assert_eq!(sizes, vec![Some(500), Some(50), Some(10)]);
    }

    #[test]
    fn test_ties_keep_input_order_and_missing_last() {
        let ranked = RankedGroups::from_groups(vec![
            ranked(b"gone", 2, None),
            ranked(b"first", 2, Some(7)),
            ranked(b"second", 3, Some(7)),
        ]);
        let digests: Vec<_> = ranked.groups.iter().map(|g| g.digest).collect();
        assert_eq!(
            digests,
            vec![Digest::of(b"first"), Digest::of(b"second"), Digest::of(b"gone")]
        );
        assert_eq!(ranked.total_reclaimable, 7 + 14);
    }

    #[test]
    fn test_rank_uses_first_present_file() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("gone.bin");
        let kept = dir.path().join("kept.bin");
        fs::write(&kept, vec![0u8; 123]).unwrap();

        let groups = HashGroups::from(vec![HashGroup::new(
            Digest::of(b"x"),
            vec![gone, kept.clone(), dir.path().join("also-gone")],
        )]);

        let ranked = rank_by_size(groups, None).unwrap();
        assert_eq!(ranked.groups[0].size, Some(123));
        assert_eq!(ranked.total_reclaimable, 246);
    }

    #[test]
    fn test_rank_all_files_gone() {
        let dir = tempdir().unwrap();
        let groups = HashGroups::from(vec![HashGroup::new(
            Digest::of(b"x"),
            vec![dir.path().join("a"), dir.path().join("b")],
        )]);

        let ranked = rank_by_size(groups, None).unwrap();
        assert_eq!(ranked.groups[0].size, None);
        assert_eq!(ranked.total_reclaimable, 0);
    }
}
