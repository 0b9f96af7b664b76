//! Duplicate grouping.
//!
//! A hash group with a single member is a file with unique content; only
//! groups of two or more files are duplicates.
//!
//! # Example
//!
//! ```
//! use dupsweep::duplicates::find_duplicates;
//! use dupsweep::scanner::{Digest, HashGroups};
//! use std::path::PathBuf;
//!
//! let groups: HashGroups = vec![
//!     (Digest::of(b"x"), PathBuf::from("./a")),
//!     (Digest::of(b"x"), PathBuf::from("./b")),
//!     (Digest::of(b"y"), PathBuf::from("./c")),
//! ]
//! .into_iter()
//! .collect();
//!
//! let dups = find_duplicates(groups, None);
//! assert_eq!(dups.len(), 1);
//! ```

use std::sync::Arc;

use crate::progress::{phase, ProgressCallback};
use crate::scanner::HashGroups;

/// Remove every group with exactly one file.
///
/// Reports one progress unit per group examined.
#[must_use]
pub fn find_duplicates(
    mut groups: HashGroups,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> HashGroups {
    let total = groups.len();
    if let Some(cb) = progress {
        cb.on_phase_start(phase::GROUP, total);
    }

    let mut examined = 0;
    groups.retain(|group| {
        examined += 1;
        if let Some(cb) = progress {
            cb.on_progress(examined, "");
        }
        group.len() > 1
    });

    if let Some(cb) = progress {
        cb.on_phase_end(phase::GROUP);
    }

    log::info!(
        "{} of {} group(s) contain duplicates ({} files)",
        groups.len(),
        total,
        groups.file_count()
    );
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressCallback;
    use crate::scanner::{Digest, HashGroup};
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ProgressCallback for Recorder {
        fn on_phase_start(&self, phase: &str, total: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {} {}", phase, total));
        }
        fn on_progress(&self, current: usize, _path: &str) {
            self.events.lock().unwrap().push(format!("{}", current));
        }
        fn on_phase_end(&self, phase: &str) {
            self.events.lock().unwrap().push(format!("end {}", phase));
        }
    }

    fn group(tag: &[u8], files: &[&str]) -> HashGroup {
        HashGroup::new(
            Digest::of(tag),
            files.iter().map(PathBuf::from).collect(),
        )
    }

    #[test]
    fn test_singletons_removed_order_kept() {
        let groups = HashGroups::from(vec![
            group(b"a", &["./a1", "./a2"]),
            group(b"b", &["./b1"]),
            group(b"c", &["./c1", "./c2", "./c3"]),
        ]);

        let dups = find_duplicates(groups, None);

        let digests: Vec<_> = dups.iter().map(|g| g.digest).collect();
        assert_eq!(digests, vec![Digest::of(b"a"), Digest::of(b"c")]);
        assert!(dups.iter().all(|g| g.len() >= 2));
    }

    #[test]
    fn test_empty_input() {
        assert!(find_duplicates(HashGroups::new(), None).is_empty());
    }

    #[test]
    fn test_progress_counts_every_group() {
        let recorder = Arc::new(Recorder::default());
        let cb: Arc<dyn ProgressCallback> = recorder.clone();
        let groups = HashGroups::from(vec![group(b"a", &["./a"]), group(b"b", &["./b", "./c"])]);

        let _ = find_duplicates(groups, Some(&cb));

        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(events, vec!["start group 2", "1", "2", "end group"]);
    }
}
