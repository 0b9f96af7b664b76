//! dupsweep - Resumable Duplicate File Finder
//!
//! Finds files with identical content under a directory tree using BLAKE3
//! digests, ranks duplicate groups by the space they waste and walks the
//! operator through discarding extra copies. Every pipeline stage is
//! checkpointed, so long scans survive restarts.

pub mod actions;
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod resolver;
pub mod scanner;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::actions::SystemActions;
use crate::checkpoint::JsonCheckpointStore;
use crate::cli::Cli;
use crate::config::Config;
use crate::error::ExitCode;
use crate::pipeline::{Pipeline, PipelineConfig};
use crate::progress::{Progress, ProgressCallback};
use crate::resolver::{ResolveOutcome, Resolver, TerminalPrompter};
use crate::scanner::ExclusionList;

/// Run the application with parsed arguments.
///
/// # Errors
///
/// Returns any fatal pipeline, checkpoint or action error.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let mut config = Config::load()?;
    config.apply_cli(&cli);
    log::debug!("Effective configuration: {:?}", config);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.show_config {
        write!(out, "{}", config.to_toml()?)?;
        return Ok(ExitCode::Success);
    }

    let mut exclusions = ExclusionList::load(&config.exclusion_path())
        .context("Failed to load the exclusion list")?;
    exclusions.extend(&config.exclude);

    let store = JsonCheckpointStore::new(&config.work_dir);
    let progress: Arc<dyn ProgressCallback> = Arc::new(Progress::new(cli.quiet));
    let pipeline_config = PipelineConfig::new(config.root.clone())
        .with_walker(config.walker_config())
        .with_exclusions(exclusions);

    let output = Pipeline::new(pipeline_config, &store)
        .with_progress(progress)
        .run(cli.is_reset())
        .with_context(|| format!("Duplicate search under {} failed", config.root.display()))?;

    output::write_summary(&mut out, &output.ranked)?;
    output::write_errors(&mut out, &output.errors)?;

    let exit_code = ExitCode::for_results(output.ranked.len(), output.errors.len());
    if output.ranked.is_empty() {
        return Ok(exit_code);
    }

    if cli.no_resolve {
        output::write_groups(&mut out, &output.ranked)?;
        return Ok(exit_code);
    }
    drop(out);

    let actions = SystemActions::new(config.trash_target());
    let stdin = io::stdin();
    let mut prompter = TerminalPrompter::new(stdin.lock(), io::stdout());
    let summary = Resolver::new(&mut prompter, &actions)
        .resolve(&output.ranked)
        .context("Resolving duplicates failed")?;

    output::write_resolution(&mut io::stdout().lock(), &summary)?;

    Ok(match summary.outcome {
        ResolveOutcome::Quit => ExitCode::Success,
        ResolveOutcome::Completed => exit_code,
    })
}
