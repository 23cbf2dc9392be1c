//! Error types for doclib.
//!
//! Library crates use [`DocLibError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all doclib operations.
#[derive(Debug, thiserror::Error)]
pub enum DocLibError {
    /// Configuration loading or validation error. Always fatal.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Corpus file or response body could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Data validation error (bad URL, schema mismatch, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Transport failure talking to the analysis service.
    #[error("network error: {0}")]
    Network(String),

    /// The analysis service answered, but not with a usable result.
    #[error("analysis error: {0}")]
    Analysis(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocLibError>;

impl DocLibError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
