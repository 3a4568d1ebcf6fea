use crate::error::{ErrorKind, Result};
use crate::manifest::Manifest;
use crate::parse::ParseOptions;
use exn::ResultExt;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, instrument};

/// File name of the manifest, relative to a package root.
pub const MANIFEST_FILE: &str = "tapp.json";

/// Loads manifests out of extracted package roots.
#[derive(Debug, Clone, Default)]
pub struct ManifestStore {
    options: ParseOptions,
}

impl ManifestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Load `<root>/tapp.json`.
    ///
    /// A missing manifest is not an error: every field just takes its
    /// default. A manifest that exists but can't be parsed fails with
    /// [`Malformed`](ErrorKind::Malformed).
    #[instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn load(&self, root: impl AsRef<Path>) -> Result<Manifest> {
        let path = root.as_ref().join(MANIFEST_FILE);
        match fs::read(&path) {
            Ok(bytes) => self.parse_file(&path, &bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No manifest found; using defaults");
                Ok(Manifest::default())
            },
            Err(e) => exn::bail!(ErrorKind::Io(e)),
        }
    }

    /// Load a manifest from an explicit path, which must exist.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Manifest> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(ErrorKind::Io)?;
        self.parse_file(path, &bytes)
    }

    fn parse_file(&self, path: &Path, bytes: &[u8]) -> Result<Manifest> {
        let manifest =
            Manifest::from_slice_with(bytes, &self.options).or_raise(|| ErrorKind::Malformed(path.to_path_buf()))?;
        debug!(name = manifest.name.as_deref(), entry = manifest.entry.as_deref(), "Loaded manifest");
        Ok(manifest)
    }
}
