//! Package identity and the fingerprint derived from it.

use crate::error::{ErrorKind, Result};
use derive_more::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// What the cache knows about a package file: where it is, how big it is and
/// when its content last changed.
///
/// Two files with the same identity are assumed to have the same content.
/// The archive bytes are never hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIdentity {
    /// Canonical absolute path.
    pub path: PathBuf,
    pub size: u64,
    pub modified: OffsetDateTime,
}

impl PackageIdentity {
    /// Read the identity of the package at `path`.
    ///
    /// Fails with [`NotFound`](ErrorKind::NotFound) unless `path` names an
    /// existing regular file (symlinks are followed).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|e| not_found_or_io(e, path))?;
        if !metadata.is_file() {
            exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
        }
        let canonical = fs::canonicalize(path).map_err(|e| not_found_or_io(e, path))?;
        let modified = metadata.modified().map_err(ErrorKind::Io)?;
        Ok(Self { path: canonical, size: metadata.len(), modified: modified.into() })
    }

    /// Deterministic BLAKE3 fingerprint of this identity.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.path.as_os_str().as_encoded_bytes());
        hasher.update(b"|");
        hasher.update(self.size.to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(self.modified.unix_timestamp_nanos().to_string().as_bytes());
        Fingerprint(hasher.finalize().to_hex().to_string())
    }
}

fn not_found_or_io(err: io::Error, path: &Path) -> ErrorKind {
    match err.kind() {
        io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
        _ => ErrorKind::Io(err),
    }
}

/// 64 lowercase hex characters; used as the cache directory name.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash)]
#[display("{_0}")]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<Path> for Fingerprint {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}
