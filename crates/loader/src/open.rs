use crate::error::{ErrorKind, Result};
use crate::resolve::{ResolvedEntry, resolve};
use std::path::{Path, PathBuf};
use tapp_cache::PackageCache;
use tapp_manifest::{Manifest, ManifestStore};
use tracing::{info, instrument};

/// Host name the UI layer maps onto [`LoadedPackage::mapping_folder`].
pub const DEFAULT_VIRTUAL_HOST: &str = "appassets";

const DIST_DIR: &str = "dist";

/// Everything a UI layer needs to show a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPackage {
    /// Extraction root inside the cache.
    pub root: PathBuf,
    /// Folder to serve: the root, or its `dist` folder when the entry is in it.
    pub mapping_folder: PathBuf,
    /// Entry relative to `root`.
    pub entry: ResolvedEntry,
    /// Entry relative to `mapping_folder`.
    pub navigate_path: String,
    pub manifest: Manifest,
    /// Manifest setting combined with the caller's override.
    pub open_dev_tools: bool,
    virtual_host: String,
}

impl LoadedPackage {
    pub fn virtual_host(&self) -> &str {
        &self.virtual_host
    }

    /// Address of the entry document under the virtual host.
    pub fn url(&self) -> String {
        format!("https://{}/{}", self.virtual_host, self.navigate_path)
    }
}

/// Turns a package file into a [`LoadedPackage`].
#[derive(Debug, Clone)]
pub struct Loader {
    cache: PackageCache,
    manifests: ManifestStore,
    virtual_host: String,
}

impl Loader {
    pub fn new(cache: PackageCache) -> Self {
        Self { cache, manifests: ManifestStore::default(), virtual_host: DEFAULT_VIRTUAL_HOST.to_string() }
    }

    /// Loader with a fresh [`PackageCache`] rooted at `cache_root`.
    pub fn with_cache_root(cache_root: impl Into<PathBuf>) -> Result<Self> {
        let cache = PackageCache::new(cache_root).map_err(ErrorKind::cache)?;
        Ok(Self::new(cache))
    }

    pub fn with_manifest_store(mut self, manifests: ManifestStore) -> Self {
        self.manifests = manifests;
        self
    }

    pub fn with_virtual_host(mut self, virtual_host: impl Into<String>) -> Self {
        self.virtual_host = virtual_host.into();
        self
    }

    pub fn cache(&self) -> &PackageCache {
        &self.cache
    }

    /// Extract (or reuse) the package, load its manifest and resolve its
    /// entry point. Nothing is returned unless all three succeed.
    #[instrument(skip_all, fields(package = %package.as_ref().display(), force_dev_tools = force_dev_tools))]
    pub fn open(&self, package: impl AsRef<Path>, force_dev_tools: bool) -> Result<LoadedPackage> {
        let root = self.cache.acquire(package.as_ref()).map_err(ErrorKind::cache)?;
        let manifest = self.manifests.load(&root).map_err(ErrorKind::manifest)?;
        let entry = resolve(&root, &manifest)?;
        let (mapping_folder, navigate_path) = mapping(&root, &entry);
        let open_dev_tools = manifest.open_dev_tools(force_dev_tools);
        info!(
            root = %root.display(),
            entry = %entry,
            mapping_folder = %mapping_folder.display(),
            open_dev_tools,
            "Opened package"
        );
        Ok(LoadedPackage {
            root,
            mapping_folder,
            entry,
            navigate_path,
            manifest,
            open_dev_tools,
            virtual_host: self.virtual_host.clone(),
        })
    }
}

/// Entries under `dist/` are served from `dist` itself, so the app's
/// relative URLs resolve against its own bundle.
fn mapping(root: &Path, entry: &ResolvedEntry) -> (PathBuf, String) {
    match entry.as_str().split_once('/') {
        Some((first, rest)) if first.eq_ignore_ascii_case(DIST_DIR) => (root.join(first), rest.to_string()),
        _ => (root.to_path_buf(), entry.as_str().to_string()),
    }
}
