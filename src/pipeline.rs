//! Checkpointed duplicate detection pipeline.
//!
//! # Overview
//!
//! The pipeline runs four stages in order, each persisted under its own
//! [`Checkpoint`]:
//!
//! 1. **scan** ([`Walker`]) - list candidate files
//! 2. **analyse** ([`hash_files`]) - hash them, collecting recoverable errors
//! 3. **dups** ([`find_duplicates`]) - drop groups with a single file
//! 4. **sizes** ([`rank_by_size`]) - size, total and rank the groups
//!
//! A stage whose checkpoint exists is loaded instead of computed. Once any
//! stage is computed, every later stage is computed too, so no stage is ever
//! derived from a checkpoint older than its input.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::checkpoint::JsonCheckpointStore;
//! use dupsweep::pipeline::{Pipeline, PipelineConfig};
//! use std::path::PathBuf;
//!
//! let store = JsonCheckpointStore::new("/tmp/dups");
//! let pipeline = Pipeline::new(PipelineConfig::new(PathBuf::from(".")), &store);
//! let output = pipeline.run(false).unwrap();
//! println!("{} duplicate groups", output.ranked.len());
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::checkpoint::{Checkpoint, CheckpointError, CheckpointStore};
use crate::duplicates::{find_duplicates, rank_by_size, RankError, RankedGroups};
use crate::progress::ProgressCallback;
use crate::scanner::{
    hash_files, ErrorRecord, ExclusionList, HashError, HashGroups, HashOutcome, Hasher, ScanError,
    Walker, WalkerConfig,
};

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A checkpoint could not be read or written.
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    /// The scan root is unusable.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Hashing hit an unrecoverable I/O error.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// Sizing a group failed.
    #[error(transparent)]
    Rank(#[from] RankError),
}

/// Inputs shared by all stages of one run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory tree to search
    pub root: PathBuf,
    /// Traversal options
    pub walker: WalkerConfig,
    /// Paths to leave out
    pub exclusions: ExclusionList,
}

impl PipelineConfig {
    /// Configuration with default traversal options and no exclusions.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            walker: WalkerConfig::default(),
            exclusions: ExclusionList::default(),
        }
    }

    /// Set the traversal options.
    #[must_use]
    pub fn with_walker(mut self, walker: WalkerConfig) -> Self {
        self.walker = walker;
        self
    }

    /// Set the exclusion list.
    #[must_use]
    pub fn with_exclusions(mut self, exclusions: ExclusionList) -> Self {
        self.exclusions = exclusions;
        self
    }
}

/// Where a stage's result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageSource {
    /// Reused from an existing checkpoint.
    Loaded,
    /// Computed during this run and persisted.
    Computed,
}

/// One line of the run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageReport {
    /// The stage's checkpoint
    pub stage: Checkpoint,
    /// Whether it was loaded or computed
    pub source: StageSource,
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Duplicate groups, largest first
    pub ranked: RankedGroups,
    /// Files that could not be hashed
    pub errors: Vec<ErrorRecord>,
    /// Per-stage provenance, in stage order
    pub report: Vec<StageReport>,
}

impl PipelineOutput {
    /// Whether every stage came from a checkpoint.
    #[must_use]
    pub fn fully_loaded(&self) -> bool {
        self.report.iter().all(|r| r.source == StageSource::Loaded)
    }
}

/// Mutable bookkeeping for one run.
struct RunState {
    force: bool,
    report: Vec<StageReport>,
}

/// The duplicate detection pipeline.
pub struct Pipeline<'a, S: CheckpointStore> {
    config: PipelineConfig,
    store: &'a S,
    hasher: Hasher,
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl<'a, S: CheckpointStore> Pipeline<'a, S> {
    /// Create a pipeline persisting into `store`.
    #[must_use]
    pub fn new(config: PipelineConfig, store: &'a S) -> Self {
        Self {
            config,
            store,
            hasher: Hasher::new(),
            progress: None,
        }
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Set the hasher.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Hasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Run all four stages. With `reset`, every checkpoint is ignored and
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns the first fatal stage or checkpoint error.
    pub fn run(&self, reset: bool) -> Result<PipelineOutput, PipelineError> {
        let mut state = RunState {
            force: reset,
            report: Vec::with_capacity(Checkpoint::ALL.len()),
        };
        if reset {
            log::info!("Reset requested, recomputing every stage");
        }

        let files: Vec<PathBuf> = self.stage(&mut state, Checkpoint::Files, || {
            let mut walker = Walker::new(
                &self.config.root,
                self.config.walker.clone(),
                self.config.exclusions.clone(),
            );
            if let Some(cb) = &self.progress {
                walker = walker.with_progress(Arc::clone(cb));
            }
            Ok(walker.scan()?)
        })?;

        let analysed: HashOutcome = self.stage(&mut state, Checkpoint::Analyse, || {
            Ok(hash_files(&files, &self.hasher, self.progress.as_ref())?)
        })?;
        let HashOutcome { groups, errors } = analysed;

        let dups: HashGroups = self.stage(&mut state, Checkpoint::Dups, || {
            Ok(find_duplicates(groups, self.progress.as_ref()))
        })?;

        let ranked: RankedGroups = self.stage(&mut state, Checkpoint::Sizes, || {
            Ok(rank_by_size(dups, self.progress.as_ref())?)
        })?;

        Ok(PipelineOutput {
            ranked,
            errors,
            report: state.report,
        })
    }

    /// Load `name` or compute and persist it.
    fn stage<T, F>(&self, state: &mut RunState, name: Checkpoint, compute: F) -> Result<T, PipelineError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, PipelineError>,
    {
        if !state.force && self.store.exists(name) {
            match self.store.read(name) {
                Ok(value) => {
                    log::info!("Loading previous {}", name);
                    state.report.push(StageReport {
                        stage: name,
                        source: StageSource::Loaded,
                    });
                    return Ok(value);
                }
                Err(CheckpointError::NotFound(_)) => {
                    log::debug!("Checkpoint {} vanished, recomputing", name);
                }
                Err(e) => return Err(e.into()),
            }
        }

        log::debug!("Computing {}", name);
        let value = compute()?;
        self.store.write(name, &value)?;
        state.force = true;
        state.report.push(StageReport {
            stage: name,
            source: StageSource::Computed,
        });
        Ok(value)
    }
}
