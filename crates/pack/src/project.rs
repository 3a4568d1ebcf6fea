use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const PACKAGE_JSON: &str = "package.json";
const EXTENSION: &str = "tapp";
const FALLBACK_NAME: &str = "app";

/// The parts of `package.json` the packer cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageJson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// A web project on disk: a directory with a `package.json`.
#[derive(Debug, Clone)]
pub struct Project {
    dir: PathBuf,
    package: PackageJson,
}

impl Project {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            exn::bail!(ErrorKind::MissingProject(dir.to_path_buf()));
        }
        let dir = fs::canonicalize(dir).map_err(ErrorKind::Io)?;
        let path = dir.join(PACKAGE_JSON);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => exn::bail!(ErrorKind::MissingPackageJson(dir)),
            Err(e) => exn::bail!(ErrorKind::Io(e)),
        };
        let package = serde_json::from_slice(&bytes).or_raise(|| ErrorKind::InvalidPackageJson(path))?;
        Ok(Self { dir, package })
    }

    /// Canonical project directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn package(&self) -> &PackageJson {
        &self.package
    }

    /// Where the archive goes.
    ///
    /// An explicit path always ends up with a `.tapp` extension. Otherwise the
    /// archive is named after `name` (falling back to `package.json`) and
    /// placed in the project directory.
    pub fn output_path(&self, explicit: Option<&Path>, name: Option<&str>) -> PathBuf {
        match explicit {
            Some(path) => {
                let mut path = path.to_path_buf();
                let has_extension = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case(EXTENSION));
                if !has_extension {
                    path.set_extension(EXTENSION);
                }
                path
            },
            None => {
                let name = name.or(self.package.name.as_deref()).unwrap_or(FALLBACK_NAME);
                self.dir.join(format!("{}.{EXTENSION}", safe_name(name)))
            },
        }
    }
}

/// A file name stem built from letters, digits, `-`, `_` and `.`, without
/// leading or trailing punctuation.
pub fn safe_name(name: &str) -> String {
    let kept: String = name.chars().filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.')).collect();
    match kept.trim_matches(['.', '_', '-']) {
        "" => FALLBACK_NAME.to_string(),
        trimmed => trimmed.to_string(),
    }
}
