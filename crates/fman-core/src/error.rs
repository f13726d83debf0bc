//! Error types for file manager operations.

use std::fmt;
use std::path::PathBuf;

/// Errors reported by the file operations that surround the diff engine.
#[derive(Debug, thiserror::Error)]
pub enum FmError {
    /// A file that was expected to exist is missing.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A directory that was expected to exist is missing.
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// The file exists but cannot be opened, usually because it is locked
    /// or the permissions forbid it.
    #[error("cannot access {}", .0.display())]
    AccessDenied(PathBuf),

    /// The file is larger than the configured buffering limit.
    #[error("{} is too large ({size} bytes, limit {limit})", .path.display())]
    TooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },

    /// A file mask is not a valid regular expression.
    #[error("invalid mask: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The destination of a command could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The named encoding is not one of the supported encodings.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Copy mode other than `0` or `1`.
    #[error("invalid copy mode: {0}")]
    InvalidCopyMode(String),

    /// Any other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`FmError`], stable across variants that
/// carry different payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    NotFound,
    DirectoryNotFound,
    AccessDenied,
    TooLarge,
    InvalidPattern,
    WriteFailed,
    UnsupportedEncoding,
    InvalidCopyMode,
    Io,
}

impl FmError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FmError::NotFound(_) => ErrorCategory::NotFound,
            FmError::DirectoryNotFound(_) => ErrorCategory::DirectoryNotFound,
            FmError::AccessDenied(_) => ErrorCategory::AccessDenied,
            FmError::TooLarge { .. } => ErrorCategory::TooLarge,
            FmError::InvalidPattern(_) => ErrorCategory::InvalidPattern,
            FmError::WriteFailed { .. } => ErrorCategory::WriteFailed,
            FmError::UnsupportedEncoding(_) => ErrorCategory::UnsupportedEncoding,
            FmError::InvalidCopyMode(_) => ErrorCategory::InvalidCopyMode,
            FmError::Io(_) => ErrorCategory::Io,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::NotFound => "not-found",
            ErrorCategory::DirectoryNotFound => "directory-not-found",
            ErrorCategory::AccessDenied => "access-denied",
            ErrorCategory::TooLarge => "too-large",
            ErrorCategory::InvalidPattern => "invalid-pattern",
            ErrorCategory::WriteFailed => "write-failed",
            ErrorCategory::UnsupportedEncoding => "unsupported-encoding",
            ErrorCategory::InvalidCopyMode => "invalid-copy-mode",
            ErrorCategory::Io => "io",
        };
        f.write_str(name)
    }
}

/// Convenience alias for file manager results.
pub type FmResult<T> = Result<T, FmError>;
