//! Exit codes for the dupsweep binary.

/// Exit codes for the dupsweep application.
///
/// - 0: Success (duplicates found, or the operator quit the resolver)
/// - 1: General error (unexpected failure)
/// - 2: No duplicates found
/// - 3: Partial success (duplicates found, some files could not be hashed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success: pipeline completed and duplicates were found.
    Success = 0,
    /// General error: an unexpected error occurred.
    GeneralError = 1,
    /// No duplicates: pipeline completed but no duplicates were found.
    NoDuplicates = 2,
    /// Partial success: some files were skipped with recoverable errors.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
            Self::NoDuplicates => "DS002",
            Self::PartialSuccess => "DS003",
        }
    }

    /// Pick the exit code for a finished run.
    #[must_use]
    pub fn for_results(duplicate_groups: usize, hash_errors: usize) -> Self {
        if duplicate_groups == 0 {
            Self::NoDuplicates
        } else if hash_errors > 0 {
            Self::PartialSuccess
        } else {
            Self::Success
        }
    }
}
