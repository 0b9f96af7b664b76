//! Interactive resolution of duplicate groups.
//!
//! # Overview
//!
//! The [`Resolver`] walks ranked groups in order and asks a [`Prompter`] what
//! to do with each one:
//!
//! - a file path: discard that file (if it still exists) and ask again while
//!   more than one file remains
//! - `skip`: leave the group as it is and move on
//! - `open`: open the first file of the group and ask again
//! - `quit`: stop immediately, leaving later groups untouched
//!
//! A group is finished once it is down to a single file, so a group of three
//! needs exactly two discards.
//!
//! Side effects go through [`FileActions`]; prompting goes through
//! [`Prompter`]. [`prompt::TerminalPrompter`] is the interactive
//! implementation.

pub mod prompt;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::actions::{ActionError, FileActions};
use crate::duplicates::RankedGroups;

pub use prompt::TerminalPrompter;

/// Error type for the resolution loop.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A discard or open action failed.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// Reading the operator's answer failed.
    #[error("failed to read answer: {0}")]
    Prompt(#[source] io::Error),
}

/// The operator's answer for the current group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// Discard this file.
    Discard(PathBuf),
    /// Leave the group and go to the next one.
    Skip,
    /// Open the first file of the group.
    Open,
    /// Stop resolving altogether.
    Quit,
}

/// What the prompter is asked to present.
#[derive(Debug, Clone, Copy)]
pub struct GroupMenu<'a> {
    /// 1-based position of the group
    pub number: usize,
    /// Number of groups
    pub total: usize,
    /// Representative size of each file
    pub size: Option<u64>,
    /// Remaining files, sorted by path
    pub files: &'a [PathBuf],
}

/// Presents a group and returns the operator's choice.
pub trait Prompter {
    /// Ask what to do with `menu`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Prompt`] if the answer cannot be read.
    fn choose(&mut self, menu: &GroupMenu<'_>) -> Result<Choice, ResolveError>;
}

/// How a resolution run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Every group was visited.
    Completed,
    /// The operator quit.
    Quit,
}

/// Result of a resolution run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveSummary {
    /// How the run ended
    pub outcome: ResolveOutcome,
    /// Groups reduced to a single file
    pub groups_resolved: usize,
    /// Groups left untouched with `skip`
    pub groups_skipped: usize,
    /// Files moved to the trash
    pub files_trashed: usize,
    /// Bytes moved to the trash
    pub bytes_freed: u64,
}

impl ResolveSummary {
    fn new() -> Self {
        Self {
            outcome: ResolveOutcome::Completed,
            groups_resolved: 0,
            groups_skipped: 0,
            files_trashed: 0,
            bytes_freed: 0,
        }
    }
}

/// Drives the per-group decision loop.
pub struct Resolver<'a, P: Prompter, A: FileActions> {
    prompter: &'a mut P,
    actions: &'a A,
}

impl<'a, P: Prompter, A: FileActions> Resolver<'a, P, A> {
    /// Create a resolver.
    pub fn new(prompter: &'a mut P, actions: &'a A) -> Self {
        Self { prompter, actions }
    }

    /// Resolve every group in order, stopping early on `quit`.
    ///
    /// # Errors
    ///
    /// Fails if an answer cannot be read or a discard fails.
    pub fn resolve(&mut self, ranked: &RankedGroups) -> Result<ResolveSummary, ResolveError> {
        let total = ranked.len();
        let mut summary = ResolveSummary::new();
        log::info!("Found {} duplicate group(s)", total);

        for (index, group) in ranked.groups.iter().enumerate() {
            let mut files = group.files.clone();

            loop {
                if files.len() <= 1 {
                    summary.groups_resolved += 1;
                    break;
                }

                let mut listed = files.clone();
                listed.sort();
                let menu = GroupMenu {
                    number: index + 1,
                    total,
                    size: group.size,
                    files: &listed,
                };

                match self.prompter.choose(&menu)? {
                    Choice::Quit => {
                        log::info!("Resolution stopped at group {}/{}", index + 1, total);
                        summary.outcome = ResolveOutcome::Quit;
                        return Ok(summary);
                    }
                    Choice::Skip => {
                        log::debug!("Skipped group {}", group.digest);
                        summary.groups_skipped += 1;
                        break;
                    }
                    Choice::Open => self.actions.open(&files[0]),
                    Choice::Discard(path) => {
                        if !files.contains(&path) {
                            log::warn!("{} is not part of this group", path.display());
                            continue;
                        }
                        if still_exists(&path) {
                            self.actions.trash(&path)?;
                            summary.files_trashed += 1;
                            summary.bytes_freed += group.size.unwrap_or(0);
                        } else {
                            log::debug!("Already gone: {}", path.display());
                        }
                        files.retain(|f| f != &path);
                    }
                }
            }
        }

        Ok(summary)
    }
}

fn still_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
