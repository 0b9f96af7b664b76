//! Command-line interface definitions for dupsweep.
//!
//! # Example
//!
//! ```bash
//! # Find duplicates under the current directory, resuming earlier work
//! dupsweep
//!
//! # Throw away every checkpoint and start over
//! dupsweep reset
//!
//! # Scan another tree and only print the report
//! dupsweep --root ~/Pictures --no-resolve
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Resumable duplicate file finder.
///
/// Scans a directory tree, hashes every file, ranks duplicate groups by the
/// space they waste and lets you discard copies one group at a time.
/// Intermediate results are checkpointed so an interrupted run resumes
/// where it stopped.
#[derive(Debug, Parser)]
#[command(name = "dupsweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pass `reset` to ignore existing checkpoints and recompute every stage
    #[arg(value_name = "MODE")]
    pub mode: Option<String>,

    /// Directory tree to search
    #[arg(short, long, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Directory for checkpoints and the exclusion list
    #[arg(long, value_name = "PATH")]
    pub work_dir: Option<PathBuf>,

    /// Directory discarded files are moved into
    #[arg(long, value_name = "PATH", conflicts_with = "system_trash")]
    pub trash_dir: Option<PathBuf>,

    /// Move discarded files to the system recycle bin
    #[arg(long)]
    pub system_trash: bool,

    /// Include hidden files and directories
    #[arg(long)]
    pub include_hidden: bool,

    /// Follow symbolic links while scanning
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Exclude paths matching this pattern (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Print the ranked duplicate groups instead of resolving them
    #[arg(long)]
    pub no_resolve: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub show_config: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,
}

impl Cli {
    /// Whether the operator asked to recompute everything.
    #[must_use]
    pub fn is_reset(&self) -> bool {
        self.mode.as_deref() == Some("reset")
    }
}
