//! Error types for ScholarStack.
//!
//! Library crates use [`ScholarStackError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all ScholarStack operations.
#[derive(Debug, thiserror::Error)]
pub enum ScholarStackError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching result pages.
    #[error("network error: {0}")]
    Network(String),

    /// HTML input that cannot be parsed (markup truncated beyond recovery).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A card signature that cannot be rendered into a selector.
    #[error("signature error: {message}")]
    Signature { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Document bytes that are not valid UTF-8.
    #[error("encoding error: {message}")]
    Encoding { message: String },

    /// Data validation error (bad marker class, unusable highlight term, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScholarStackError>;

impl ScholarStackError {
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

    /// Create a signature error from any displayable message.
    pub fn signature(msg: impl Into<String>) -> Self {
        Self::Signature {
            message: msg.into(),
        }
    }

    /// Create an encoding error from any displayable message.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding {
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
