//! Failure taxonomy shared by folder lifecycle operations and file classification.
//!
//! Every failure that a caller can observe is either a [`FolderError`] returned
//! directly, or a [`Failure`] record collected into a report when processing
//! continues past it.

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Characters that may never appear in a folder name.
pub const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Errors produced by folder lifecycle operations and file moves.
#[derive(Debug, Error)]
pub enum FolderError {
    /// The name is empty or contains a reserved path character.
    #[error("Invalid folder name '{name}': must be non-empty and free of < > : \" / \\ | ? *")]
    InvalidName { name: String },

    /// The referenced folder (or file) does not exist.
    #[error("Not found: {path}")]
    NotFound { path: PathBuf },

    /// An empty-only deletion was attempted on a folder with contents.
    #[error("Folder is not empty: {path}")]
    NotEmpty { path: PathBuf },

    /// The process lacks rights to act on the path.
    #[error("Permission denied on {path}: {source}")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other underlying filesystem failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FolderError {
    /// Classifies an `io::Error` raised while acting on `path`.
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path, source },
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::DirectoryNotEmpty => Self::NotEmpty { path },
            _ => Self::Io { path, source },
        }
    }

    pub fn invalid_name(name: &str) -> Self {
        Self::InvalidName {
            name: name.to_string(),
        }
    }

    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidName { .. } => FailureKind::InvalidName,
            Self::NotFound { .. } => FailureKind::NotFound,
            Self::NotEmpty { .. } => FailureKind::NotEmpty,
            Self::PermissionDenied { .. } => FailureKind::Permission,
            Self::Io { .. } => FailureKind::Io,
        }
    }

    /// Returns the path the error refers to. For invalid names this is the
    /// rejected name itself.
    pub fn path(&self) -> &Path {
        match self {
            Self::InvalidName { name } => Path::new(name),
            Self::NotFound { path }
            | Self::NotEmpty { path }
            | Self::PermissionDenied { path, .. }
            | Self::Io { path, .. } => path,
        }
    }
}

/// Result type for folder lifecycle and classification operations.
pub type FolderResult<T> = Result<T, FolderError>;

/// Coarse classification of a failure, used in reports and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    InvalidName,
    NotFound,
    NotEmpty,
    Permission,
    Io,
}

impl FailureKind {
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::InvalidName => "invalid name",
            FailureKind::NotFound => "not found",
            FailureKind::NotEmpty => "not empty",
            FailureKind::Permission => "permission denied",
            FailureKind::Io => "I/O error",
        }
    }
}

/// A structured failure record: kind, offending path and a readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub path: PathBuf,
    pub message: String,
}

impl From<&FolderError> for Failure {
    fn from(err: &FolderError) -> Self {
        Self {
            kind: err.kind(),
            path: err.path().to_path_buf(),
            message: err.to_string(),
        }
    }
}

impl From<FolderError> for Failure {
    fn from(err: FolderError) -> Self {
        Self::from(&err)
    }
}
