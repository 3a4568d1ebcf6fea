//! Manifest Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A manifest error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for manifest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The document is not valid JSON (including empty files and invalid UTF-8).
    #[display("manifest is not valid JSON")]
    Parse,
    /// A field is present but has the wrong type or an out-of-range value.
    #[display("invalid value for '{field}': {value}")]
    InvalidValue {
        /// Dotted path of the field, e.g. `window.width`.
        field: String,
        /// The offending value, as JSON.
        value: String,
    },
    /// Only raised when unknown fields are not being ignored.
    #[display("unknown field: {_0}")]
    UnknownField(#[error(not(source))] String),
    /// The manifest file exists but can't be used. Wraps one of the above.
    #[display("malformed manifest: {}", _0.display())]
    Malformed(#[error(not(source))] PathBuf),
    #[display("failed to serialize manifest")]
    Serialize,
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
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A manifest either parses or it doesn't; only reading it can be flaky.
        matches!(self, Self::Io(_))
    }
}
