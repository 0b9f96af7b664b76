//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`Progress`] struct which implements
//! [`ProgressCallback`] to display one progress bar per pipeline stage.
//! Reporting is purely observational: nothing in the pipeline depends on it.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Phase names reported by the pipeline stages.
pub mod phase {
    /// Directory traversal.
    pub const SCAN: &str = "scan";
    /// Content hashing.
    pub const HASH: &str = "hash";
    /// Singleton removal.
    pub const GROUP: &str = "group";
    /// Size lookup and ranking.
    pub const SIZE: &str = "size";
}

/// Progress callback for pipeline phases.
///
/// Implement this trait to receive progress updates during
/// the duplicate detection pipeline.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (see [`phase`])
    /// * `total` - Total number of items to process, 0 when unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Current item number (1-based)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Progress reporter using indicatif.
///
/// Only one stage runs at a time, so a single active bar is kept.
pub struct Progress {
    active: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            active: Mutex::new(None),
            quiet,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{prefix:>8} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn title(phase: &str) -> &'static str {
        match phase {
            phase::SCAN => "1. Finding files",
            phase::HASH => "2. Analysing",
            phase::GROUP => "3. Finding duplicates",
            phase::SIZE => "4. Calculating sizes",
            _ => "Working",
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let pb = if total == 0 && phase == phase::SCAN {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(Self::bar_style());
            pb.set_prefix(phase.to_string());
            pb
        };
        pb.set_message(Self::title(phase));

        if let Ok(mut active) = self.active.lock() {
            if let Some(previous) = active.replace(pb) {
                previous.finish_and_clear();
            }
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }

        if let Ok(active) = self.active.lock() {
            if let Some(pb) = active.as_ref() {
                pb.set_position(current as u64);
                if !path.is_empty() {
                    pb.set_message(truncate_path(path, 40));
                }
            }
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        if let Ok(mut active) = self.active.lock() {
            if let Some(pb) = active.take() {
                pb.finish_with_message(format!("{} complete", Self::title(phase)));
            }
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len + 4 > max_len {
        let tail: String = file_name.chars().skip(name_len + 3 - max_len).collect();
        return format!("...{}", tail);
    }

    format!(".../{}", file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_path_unchanged() {
        assert_eq!(truncate_path("./a/b.txt", 40), "./a/b.txt");
    }

    #[test]
    fn test_truncate_long_path_keeps_file_name() {
        let path = format!("./{}/photo.jpg", "x".repeat(60));
        assert_eq!(truncate_path(&path, 40), ".../photo.jpg");
    }

    #[test]
    fn test_truncate_long_file_name() {
        let path = format!("./{}", "y".repeat(60));
        let truncated = truncate_path(&path, 20);
        assert!(truncated.starts_with("..."));
        assert_eq!(truncated.chars().count(), 20);
    }

    #[test]
    fn test_quiet_progress_is_silent() {
        let progress = Progress::new(true);
        progress.on_phase_start(phase::HASH, 10);
        progress.on_progress(1, "./a.txt");
        progress.on_phase_end(phase::HASH);
        assert!(progress.active.lock().unwrap().is_none());
    }
}
