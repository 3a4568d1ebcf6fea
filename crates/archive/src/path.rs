//! Path validation and security utilities.
//!
//! Everything that turns an untrusted archive entry name into a path on disk
//! goes through here first. Paths must stay relative to whatever root they
//! are eventually joined onto.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Lexically normalizes a relative path, refusing anything that could leave
/// the root it is joined onto.
///
/// `.` segments and repeated separators are dropped, and `..` pops the
/// previous segment. Absolute paths, Windows prefixes, NUL bytes and `..`
/// segments with nothing left to pop are rejected with
/// [`InvalidPath`](crate::error::ErrorKind::InvalidPath). An input that
/// normalizes to nothing (`""`, `"./"`) yields an empty path.
pub fn normalize(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir => {},
            // An archive entry never gets to pick where the root is.
            Component::RootDir | Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
                }
            },
        }
    }
    Ok(components.into_iter().collect())
}

/// Validates a relative path, normalizing it and requiring that something is
/// left afterwards.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use tapp_archive::validate_path;
/// // Valid paths
/// assert!(validate_path("dist/index.html").is_ok());
/// assert!(validate_path("dist/../tapp.json").is_ok()); // (never leaves the root)
/// // Invalid paths
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("/etc/passwd").is_err());
/// assert!(validate_path("a\0b").is_err());
/// // Paths get resolved
/// assert_eq!(
///     validate_path("wrong/../dist/./assets//app.js").unwrap(),
///     Path::new("dist/assets/app.js")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let normalized = normalize(path.as_ref())?;
    if normalized.as_os_str().is_empty() {
        exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
    }
    Ok(normalized)
}

/// Normalizes a zip entry name into a relative path.
///
/// Zip files written on Windows frequently use `\` as a separator, which Unix
/// would otherwise treat as part of a file name, hiding `..\..\` traversal.
/// Both separators are treated the same before normalizing.
pub fn normalize_entry_name(name: &str) -> Result<PathBuf> {
    normalize(name.replace('\\', "/"))
}

/// Converts a relative path into the forward-slash form used for names
/// inside an archive.
pub fn archive_name(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let validated = validate(path)?;
    let mut segments = Vec::new();
    for component in validated.components() {
        match component.as_os_str().to_str() {
            Some(segment) => segments.push(segment),
            None => exn::bail!(ErrorKind::InvalidPath(path.to_path_buf())),
        }
    }
    Ok(segments.join("/"))
}
