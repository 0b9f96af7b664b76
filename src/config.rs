//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory
//! 3. `DUPSWEEP_*` environment variables
//! 4. Command-line flags (see [`Config::apply_cli`])

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::actions::TrashTarget;
use crate::cli::Cli;
use crate::scanner::exclusion::EXCLUSION_FILE_NAME;
use crate::scanner::WalkerConfig;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "DUPSWEEP_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory tree to search for duplicates.
    pub root: PathBuf,
    /// Directory holding checkpoints and the exclusion list.
    pub work_dir: PathBuf,
    /// Directory discarded files are moved into.
    pub trash_dir: PathBuf,
    /// Use the platform recycle bin instead of `trash_dir`.
    pub system_trash: bool,
    /// Include hidden files and directories.
    pub include_hidden: bool,
    /// Follow symbolic links while scanning.
    pub follow_symlinks: bool,
    /// Exclusion patterns added to the ones from the exclusion list file.
    pub exclude: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            work_dir: std::env::temp_dir().join("dups"),
            trash_dir: Self::default_trash_dir(),
            system_trash: false,
            include_hidden: false,
            follow_symlinks: false,
            exclude: Vec::new(),
        }
    }
}

impl Config {
    /// Load the configuration from defaults, the config file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file or an environment variable holds
    /// a value of the wrong type.
    pub fn load() -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = Self::config_path() {
            log::debug!("Reading configuration from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .context("Invalid configuration")
    }

    /// Apply command-line overrides.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(root) = &cli.root {
            self.root = root.clone();
        }
        if let Some(work_dir) = &cli.work_dir {
            self.work_dir = work_dir.clone();
        }
        if let Some(trash_dir) = &cli.trash_dir {
            self.trash_dir = trash_dir.clone();
        }
        self.system_trash |= cli.system_trash;
        self.include_hidden |= cli.include_hidden;
        self.follow_symlinks |= cli.follow_symlinks;
        self.exclude.extend(cli.exclude.iter().cloned());
    }

    /// Render the effective configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if a path cannot be represented in TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration")
    }

    /// Path of the optional exclusion list file.
    #[must_use]
    pub fn exclusion_path(&self) -> PathBuf {
        self.work_dir.join(EXCLUSION_FILE_NAME)
    }

    /// Walker options derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(self.follow_symlinks, self.include_hidden)
    }

    /// Where discarded files go.
    #[must_use]
    pub fn trash_target(&self) -> TrashTarget {
        if self.system_trash {
            TrashTarget::System
        } else {
            TrashTarget::Directory(self.trash_dir.clone())
        }
    }

    /// `~/.trash`, or `.trash` in the current directory without a home directory.
    #[must_use]
    pub fn default_trash_dir() -> PathBuf {
        BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".trash"))
            .unwrap_or_else(|| PathBuf::from(".trash"))
    }

    /// Platform-specific configuration file path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "dupsweep", "dupsweep")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
