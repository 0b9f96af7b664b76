//! Exclusion list applied to scanned paths.
//!
//! Each pattern is a regular expression matched anywhere in the path string,
//! so plain words behave as substring matches. The walker passes paths
//! relative to the scan root (`./photos/a.jpg`). Tokens that are not valid
//! regular expressions are matched literally.

use std::fs;
use std::io;
use std::path::Path;

use regex::Regex;

use super::ScanError;

/// File name of the exclusion list inside the working directory.
pub const EXCLUSION_FILE_NAME: &str = "excluded_list";

/// Immutable set of exclusion patterns.
#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    patterns: Vec<Regex>,
}

impl ExclusionList {
    /// Build an exclusion list from pattern strings.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        list.extend(patterns);
        list
    }

    /// Parse whitespace-separated tokens.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        Self::new(content.split_whitespace())
    }

    /// Load the exclusion list from a file. A missing file excludes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load(path: &Path) -> Result<Self, ScanError> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let list = Self::parse(&content);
                log::debug!(
                    "Loaded {} exclusion pattern(s) from {}",
                    list.len(),
                    path.display()
                );
                Ok(list)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No exclusion list at {}", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(ScanError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// Add more patterns.
    pub fn extend<I, S>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if pattern.is_empty() {
                continue;
            }
            let regex = Regex::new(pattern).or_else(|e| {
                log::warn!(
                    "Exclusion pattern '{}' is not a valid regex ({}), matching it literally",
                    pattern,
                    e
                );
                Regex::new(&regex::escape(pattern))
            });
            match regex {
                Ok(regex) => self.patterns.push(regex),
                Err(e) => log::warn!("Ignoring exclusion pattern '{}': {}", pattern, e),
            }
        }
    }

    /// Whether `path` matches any pattern.
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let text = path.to_string_lossy();
        self.patterns.iter().any(|re| re.is_match(&text))
    }

    /// Number of patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the list excludes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The patterns as written.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }
}
