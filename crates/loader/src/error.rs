//! Loader Error Types
//!
//! Every way opening a package can fail, as one flat list. Errors from the
//! cache and manifest crates are mapped onto these kinds and kept as child
//! frames in the `exn` error tree.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;
use tapp_cache::error::{Error as CacheError, ErrorKind as CacheErrorKind};
use tapp_manifest::MANIFEST_FILE;
use tapp_manifest::error::{Error as ManifestError, ErrorKind as ManifestErrorKind};

/// A loader error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for loader operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The package file does not exist.
    #[display("package not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// The package contains an entry that would extract outside its directory.
    #[display("unsafe archive entry: {_0}")]
    UnsafeArchiveEntry(#[error(not(source))] String),
    /// The package is not a zip archive.
    #[display("package is not a valid archive")]
    InvalidArchive,
    /// The package has a manifest, but it can't be parsed.
    #[display("malformed manifest: {}", _0.display())]
    MalformedManifest(#[error(not(source))] PathBuf),
    /// The entry point resolves to somewhere outside the package.
    #[display("entry escapes the package root: {_0}")]
    PathEscape(#[error(not(source))] String),
    /// The entry point does not name a file inside the package.
    #[display("entry not found: {entry} ({})", path.display())]
    EntryNotFound {
        /// The entry as requested (manifest value or convention).
        entry: String,
        /// Where it was looked for.
        path: PathBuf,
    },
    /// The configured cache root can't be used.
    #[display("invalid cache root: {}", _0.display())]
    InvalidCacheRoot(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

fn copy_io(err: &IoError) -> IoError {
    IoError::new(err.kind(), err.to_string())
}

impl ErrorKind {
    /// Convert a cache error into a loader error, keeping the cache crate's
    /// `Exn` frame as a child in the error tree.
    #[track_caller]
    pub fn cache(err: CacheError) -> Error {
        let kind = match &*err {
            CacheErrorKind::NotFound(path) => ErrorKind::NotFound(path.clone()),
            CacheErrorKind::InvalidRoot(path) => ErrorKind::InvalidCacheRoot(path.clone()),
            CacheErrorKind::UnsafeArchiveEntry(name) => ErrorKind::UnsafeArchiveEntry(name.clone()),
            CacheErrorKind::InvalidArchive => ErrorKind::InvalidArchive,
            CacheErrorKind::Io(e) => ErrorKind::Io(copy_io(e)),
        };
        err.raise(kind)
    }

    /// Convert a manifest error into a loader error. Anything that isn't an
    /// I/O failure means the manifest is malformed.
    #[track_caller]
    pub fn manifest(err: ManifestError) -> Error {
        let kind = match &*err {
            ManifestErrorKind::Malformed(path) => ErrorKind::MalformedManifest(path.clone()),
            ManifestErrorKind::Io(e) => ErrorKind::Io(copy_io(e)),
            _ => ErrorKind::MalformedManifest(PathBuf::from(MANIFEST_FILE)),
        };
        err.raise(kind)
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
