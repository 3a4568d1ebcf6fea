//! CLI Error Types
//!
//! Each command wraps whatever its library crate returned, so the printed
//! error tree starts with what the user was trying to do.

use derive_more::{Display, Error};

/// A CLI error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for CLI commands.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not open package")]
    Open,
    #[display("could not locate package in cache")]
    CachePath,
    #[display("could not pack project")]
    Pack,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
