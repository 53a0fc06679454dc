//! Error types surfaced by the library.
//!
//! Fatal failures (anything that prevents obtaining the archive, opening it,
//! or writing the output) are reported through [`LinearizeError`]. Failures
//! scoped to a single archive entry never leave the pipeline; they are
//! recorded in [`ProcessingStatistics`](crate::ProcessingStatistics) instead.

use thiserror::Error;

/// Fatal error kinds, one variant per category the caller must distinguish.
#[derive(Debug, Error)]
pub enum LinearizeError {
    /// The source is neither a readable local file nor a recognized GitHub URL.
    #[error("invalid source: {0}")]
    InvalidSource(String),

    /// Transport failure or non-success status while downloading.
    #[error("failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    /// A branch (pull request head or default branch) could not be determined.
    #[error("could not resolve branch: {0}")]
    UnresolvedBranch(String),

    /// The archive bytes do not form a readable ZIP structure.
    #[error("cannot open archive: {0}")]
    ArchiveOpen(String),

    /// The output destination cannot be created or written.
    #[error("cannot write output: {0}")]
    OutputWrite(String),

    /// Settings that cannot be honored, such as an unknown encoding label.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LinearizeError {
    /// Stable, machine-friendly name of the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            LinearizeError::InvalidSource(_) => "invalid-source",
            LinearizeError::Download { .. } => "download",
            LinearizeError::UnresolvedBranch(_) => "unresolved-branch",
            LinearizeError::ArchiveOpen(_) => "archive-open",
            LinearizeError::OutputWrite(_) => "output-write",
            LinearizeError::Config(_) => "config",
        }
    }
}

pub type Result<T, E = LinearizeError> = std::result::Result<T, E>;
