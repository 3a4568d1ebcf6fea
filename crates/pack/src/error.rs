//! Pack Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A packaging error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for packaging operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The project path does not exist or is not a directory.
    #[display("project directory not found: {}", _0.display())]
    MissingProject(#[error(not(source))] PathBuf),
    #[display("no package.json in project: {}", _0.display())]
    MissingPackageJson(#[error(not(source))] PathBuf),
    #[display("could not parse package.json: {}", _0.display())]
    InvalidPackageJson(#[error(not(source))] PathBuf),
    /// A package manager needed for `--build` isn't on `PATH`.
    #[display("'{_0}' not found in PATH")]
    ToolNotFound(#[error(not(source))] String),
    /// A build step exited unsuccessfully. `code` is `None` if it was killed.
    #[display(
        "command `{command}` failed with {}",
        code.map_or_else(|| "no exit code".to_string(), |code| format!("exit code {code}"))
    )]
    CommandFailed {
        command: String,
        code: Option<i32>,
    },
    /// There's nothing to pack; the build hasn't been run.
    #[display("build output not found: {} (run with --build?)", _0.display())]
    MissingDist(#[error(not(source))] PathBuf),
    /// The project's own `tapp.json` can't be parsed.
    #[display("malformed manifest: {}", _0.display())]
    MalformedManifest(#[error(not(source))] PathBuf),
    /// An `--include` path does not exist.
    #[display("path not found: {}", _0.display())]
    MissingPath(#[error(not(source))] PathBuf),
    #[display("invalid value for option '{_0}'")]
    InvalidOption(#[error(not(source))] &'static str),
    /// Writing the archive failed.
    #[display("failed to write archive")]
    Archive,
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
        matches!(self, Self::Io(_) | Self::CommandFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_display() {
        let kind = ErrorKind::CommandFailed { command: "npm run build".to_string(), code: Some(2) };
        assert_eq!(kind.to_string(), "command `npm run build` failed with exit code 2");
        let kind = ErrorKind::CommandFailed { command: "npm ci".to_string(), code: None };
        assert_eq!(kind.to_string(), "command `npm ci` failed with no exit code");
    }
}
