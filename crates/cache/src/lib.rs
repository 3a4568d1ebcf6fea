//! Content-addressed extraction cache for `.tapp` packages.
//!
//! Every package is unpacked at most once per [`PackageIdentity`] into
//! `<cache-root>/<fingerprint>`. The cache is never evicted here; whoever owns
//! the cache root (usually the OS temp reaper) cleans it up.
//!
//! # Publishing
//! A package is extracted into a `.staging-*` sibling first and renamed into
//! place once extraction has finished. A directory named after a fingerprint
//! is therefore always complete, and concurrent callers acquiring the same
//! package never see a half-written tree. When two callers race, both extract
//! and the second rename loses; the loser throws its copy away.

pub mod error;
mod identity;

use crate::error::{ErrorKind, Result};
pub use crate::identity::{Fingerprint, PackageIdentity};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

const STAGING_PREFIX: &str = ".staging-";

/// Maps package files onto extracted directories under a single cache root.
#[derive(Debug, Clone)]
pub struct PackageCache {
    root: PathBuf,
}

impl PackageCache {
    /// Open (creating if necessary) the cache rooted at `root`, which must be
    /// absolute.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidRoot(root));
        }
        fs::create_dir_all(&root).map_err(ErrorKind::Io)?;
        let root = fs::canonicalize(&root).map_err(ErrorKind::Io)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory `package` extracts to, without extracting anything.
    pub fn locate(&self, package: impl AsRef<Path>) -> Result<PathBuf> {
        let identity = PackageIdentity::from_path(package)?;
        Ok(self.root.join(identity.fingerprint()))
    }

    /// Return the directory holding the extracted contents of `package`,
    /// extracting it first if this identity hasn't been seen before.
    ///
    /// A cache hit never opens the archive.
    #[instrument(skip_all, fields(package = %package.as_ref().display(), fingerprint, size))]
    pub fn acquire(&self, package: impl AsRef<Path>) -> Result<PathBuf> {
        let identity = PackageIdentity::from_path(package.as_ref())?;
        let fingerprint = identity.fingerprint();
        let span = tracing::Span::current();
        span.record("fingerprint", fingerprint.as_str());
        span.record("size", identity.size);

        let target = self.root.join(&fingerprint);
        if target.is_dir() {
            debug!("Cache hit");
            return Ok(target);
        }
        self.extract(&identity, &target)?;
        Ok(target)
    }

    fn extract(&self, identity: &PackageIdentity, target: &Path) -> Result<()> {
        let archive = File::open(&identity.path).map_err(ErrorKind::Io)?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.root)
            .map_err(ErrorKind::Io)?;
        // Dropping `staging` on any error below removes the partial tree.
        let extracted =
            tapp_archive::extract_into(BufReader::new(archive), staging.path()).map_err(ErrorKind::archive)?;

        match fs::rename(staging.path(), target) {
            Ok(()) => {
                info!(files = extracted.files, directories = extracted.directories, "Extracted package");
                Ok(())
            },
            Err(e) if target.is_dir() => {
                warn!(error = %e, "Package was published by another caller first; discarding our copy");
                Ok(())
            },
            Err(e) => exn::bail!(ErrorKind::Io(e)),
        }
    }
}
