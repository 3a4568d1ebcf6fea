//! Cache Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;
use tapp_archive::error::{Error as ArchiveError, ErrorKind as ArchiveErrorKind};

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Package file does not exist or is not a regular file.
    #[display("package not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// The cache root must be an absolute directory path.
    #[display("invalid cache root: {}", _0.display())]
    InvalidRoot(#[error(not(source))] PathBuf),
    /// The archive tried to write outside its extraction directory.
    #[display("unsafe archive entry: {_0}")]
    UnsafeArchiveEntry(#[error(not(source))] String),
    /// The package is not a readable zip archive.
    #[display("invalid or corrupted archive")]
    InvalidArchive,
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}
impl ErrorKind {
    /// Convert an archive error into a cache error, keeping the archive
    /// crate's `Exn` frame as a child in the error tree.
    #[track_caller]
    pub fn archive(err: ArchiveError) -> Error {
        let kind = match &*err {
            ArchiveErrorKind::UnsafeEntry(name) => ErrorKind::UnsafeArchiveEntry(name.clone()),
            ArchiveErrorKind::InvalidPath(path) => ErrorKind::UnsafeArchiveEntry(path.display().to_string()),
            ArchiveErrorKind::InvalidArchive => ErrorKind::InvalidArchive,
            ArchiveErrorKind::Io(e) => ErrorKind::Io(IoError::new(e.kind(), e.to_string())),
        };
        err.raise(kind)
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
