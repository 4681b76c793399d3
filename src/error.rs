//! Error types for the memo store.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MemoError {
    #[error("memo not found: `{0}`")]
    NotFound(String),

    #[error("invalid date `{0}`, expected YYYY/MM/DD")]
    InvalidDate(String),

    #[error("malformed memo document: {0}")]
    MalformedDocument(String),

    #[error("failed to serialize memos: {0}")]
    Serialize(String),

    #[error("io error on `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MemoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn serialize(reason: impl std::fmt::Display) -> Self {
        Self::Serialize(reason.to_string())
    }

    pub(crate) fn malformed(reason: impl std::fmt::Display) -> Self {
        Self::MalformedDocument(reason.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, MemoError>;
