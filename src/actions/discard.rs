//! Moving discarded duplicates out of the scanned tree.
//!
//! Files go into a per-user trash directory by default. Names that already
//! exist there get a numeric suffix (`photo.jpg`, `photo.1.jpg`, ...) so an
//! earlier discard is never overwritten.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::ActionError;

/// Where discarded files end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrashTarget {
    /// A plain directory; files are moved into it.
    Directory(PathBuf),
    /// The platform recycle bin.
    System,
}

/// Pick a destination inside `dir` that does not exist yet.
fn unique_destination(dir: &Path, file_name: &std::ffi::OsStr) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = name.extension().map(|e| e.to_string_lossy().into_owned());

    (1u32..)
        .map(|n| match &extension {
            Some(ext) => dir.join(format!("{}.{}.{}", stem, n, ext)),
            None => dir.join(format!("{}.{}", stem, n)),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Move `path` into `dir`, returning the new location.
///
/// Falls back to copy-then-remove when a rename is impossible, e.g. when the
/// trash directory is on another filesystem.
///
/// # Errors
///
/// Returns [`ActionError`] if the directory cannot be created or the file
/// cannot be moved.
pub fn move_to_trash_dir(path: &Path, dir: &Path) -> Result<PathBuf, ActionError> {
    let file_name = path.file_name().ok_or_else(|| ActionError::Io {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
    })?;

    fs::create_dir_all(dir).map_err(|e| ActionError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let dest = unique_destination(dir, file_name);

    if let Err(rename_err) = fs::rename(path, &dest) {
        log::debug!(
            "Rename of {} failed ({}), copying instead",
            path.display(),
            rename_err
        );
        fs::copy(path, &dest).map_err(|e| ActionError::Move {
            path: path.to_path_buf(),
            target: dest.clone(),
            source: e,
        })?;
        fs::remove_file(path).map_err(|e| ActionError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    Ok(dest)
}
