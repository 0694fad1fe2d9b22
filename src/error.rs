//src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for scanner and validator operations.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Failures raised while streaming a member file.
///
/// These never reach the caller of `validate_files`; the orchestrator turns
/// each one into a negative verdict for the member that produced it.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The file could not be opened or read.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value that must be numeric could not be parsed.
    #[error("VALUE '{value}' IN COLUMN {column} OF ROW {line} IS NOT NUMERIC")]
    NotNumeric {
        line: usize,
        column: usize,
        value: String,
    },
}

impl ScanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for read failures, false for content problems.
    pub fn is_io(&self) -> bool {
        matches!(self, ScanError::Io { .. })
    }
}
