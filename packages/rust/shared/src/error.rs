//! Error types for stylebuild.
//!
//! Library crates use [`StyleBuildError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` and reports every variant the same way:
//! print the error, exit non-zero.

use std::path::PathBuf;

/// Top-level error type for all stylebuild operations.
#[derive(Debug, thiserror::Error)]
pub enum StyleBuildError {
    /// Configuration file could not be read as a configuration object.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The source stylesheet is not structurally valid CSS.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A pipeline stage rejected its input (unknown `@apply` class, bad
    /// `theme()` path, post-processing failure, ...).
    #[error("transform error: {message}")]
    Transform { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, StyleBuildError>;

impl StyleBuildError {
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

    /// Create a transform error from any displayable message.
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform {
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
