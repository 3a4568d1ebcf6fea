use crate::error::{ErrorKind, Result};
use crate::project::Project;
use exn::ResultExt;
use std::fs;
use tapp_manifest::{DEFAULT_HEIGHT, DEFAULT_WIDTH, DebugConfig, MANIFEST_FILE, Manifest, ManifestStore, WindowConfig};
use tracing::debug;

const FALLBACK_NAME: &str = "TappApp";
const FALLBACK_VERSION: &str = "0.0.0";
const DEFAULT_ENTRY: &str = "dist/index.html";

/// Values for a generated `tapp.json`. Ignored when the project already has
/// one, unless it's being replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestOverrides {
    pub entry: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub title: Option<String>,
    pub width: u32,
    pub height: u32,
    /// Window can't be resized.
    pub fixed: bool,
    pub devtools: bool,
}

impl Default for ManifestOverrides {
    fn default() -> Self {
        Self {
            entry: None,
            name: None,
            version: None,
            title: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fixed: false,
            devtools: false,
        }
    }
}

/// The manifest that goes into the archive.
#[derive(Debug, Clone)]
pub(crate) struct PreparedManifest {
    pub manifest: Manifest,
    /// Exactly what is written as `tapp.json`.
    pub bytes: Vec<u8>,
    pub generated: bool,
}

/// Use the project's `tapp.json` as-is, or generate one from the overrides
/// and `package.json`. Nothing is written to the project.
pub(crate) fn prepare(project: &Project, overrides: &ManifestOverrides, force: bool) -> Result<PreparedManifest> {
    let existing = project.dir().join(MANIFEST_FILE);
    if existing.is_file() && !force {
        debug!(path = %existing.display(), "Using existing manifest");
        let manifest =
            ManifestStore::new().load_file(&existing).or_raise(|| ErrorKind::MalformedManifest(existing.clone()))?;
        let bytes = fs::read(&existing).map_err(ErrorKind::Io)?;
        return Ok(PreparedManifest { manifest, bytes, generated: false });
    }

    let manifest = generate(project, overrides)?;
    let json = manifest.to_json_pretty().or_raise(|| ErrorKind::Archive)?;
    Ok(PreparedManifest { manifest, bytes: json.into_bytes(), generated: true })
}

fn generate(project: &Project, overrides: &ManifestOverrides) -> Result<Manifest> {
    if overrides.width == 0 {
        exn::bail!(ErrorKind::InvalidOption("width"));
    }
    if overrides.height == 0 {
        exn::bail!(ErrorKind::InvalidOption("height"));
    }
    let package = project.package();
    let name = overrides.name.clone().or_else(|| package.name.clone()).unwrap_or_else(|| FALLBACK_NAME.to_string());
    let version =
        overrides.version.clone().or_else(|| package.version.clone()).unwrap_or_else(|| FALLBACK_VERSION.to_string());
    Ok(Manifest {
        window: WindowConfig {
            title: Some(overrides.title.clone().unwrap_or_else(|| name.clone())),
            width: overrides.width,
            height: overrides.height,
            resizable: !overrides.fixed,
        },
        debug: DebugConfig { open_dev_tools: overrides.devtools },
        entry: Some(overrides.entry.clone().unwrap_or_else(|| DEFAULT_ENTRY.to_string())),
        name: Some(name),
        version: Some(version),
    })
}
