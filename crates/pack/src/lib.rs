//! Packing web projects into `.tapp` archives.
//!
//! A project is a directory with a `package.json` whose build writes to
//! `dist/`. The archive holds `tapp.json` at its root, everything under
//! `dist/`, and any extra `include` paths, all named relative to the project.

mod build;
pub mod error;
mod manifest;
mod project;

pub use crate::build::{PackageManager, build};
use crate::error::{ErrorKind, Result};
pub use crate::manifest::ManifestOverrides;
pub use crate::project::{PackageJson, Project, safe_name};
use exn::ResultExt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tapp_archive::ArchiveWriter;
use tapp_manifest::{MANIFEST_FILE, Manifest};
use tracing::{info, instrument};

pub(crate) const DIST_DIR: &str = "dist";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackOptions {
    pub project: PathBuf,
    /// Defaults to `<project>/<name>.tapp`.
    pub out: Option<PathBuf>,
    /// Run install and build first.
    pub build: bool,
    /// Remove `dist/` before building.
    pub clean: bool,
    /// Extra files or directories, relative to the project or absolute.
    pub include: Vec<PathBuf>,
    /// Generate `tapp.json` even if the project has one.
    pub force_manifest: bool,
    pub manifest: ManifestOverrides,
}

impl PackOptions {
    pub fn new(project: impl Into<PathBuf>) -> Self {
        Self { project: project.into(), ..Default::default() }
    }
}

/// A finished archive.
#[derive(Debug, Clone)]
pub struct Packed {
    pub path: PathBuf,
    /// Number of files in the archive, `tapp.json` included.
    pub entries: usize,
    pub manifest: Manifest,
    /// Whether `tapp.json` was generated rather than taken from the project.
    pub generated_manifest: bool,
}

/// Build (optionally) and pack a project.
#[instrument(skip_all, fields(project = %options.project.display()))]
pub fn pack(options: &PackOptions) -> Result<Packed> {
    let project = Project::open(&options.project)?;
    if options.build {
        build(project.dir(), options.clean)?;
    }
    let dist = project.dir().join(DIST_DIR);
    if !dist.is_dir() {
        exn::bail!(ErrorKind::MissingDist(dist));
    }
    let includes = options
        .include
        .iter()
        .map(|include| resolve_include(&project, include))
        .collect::<Result<Vec<_>>>()?;
    let prepared = manifest::prepare(&project, &options.manifest, options.force_manifest)?;

    let output = project.output_path(options.out.as_deref(), prepared.manifest.name.as_deref());
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(ErrorKind::Io)?;
    }
    info!(output = %output.display(), "Creating archive");
    let entries = match write_archive(&output, &prepared.bytes, &dist, &includes, project.dir()) {
        Ok(entries) => entries,
        Err(err) => {
            // Don't leave a truncated archive lying around.
            let _ = fs::remove_file(&output);
            return Err(err);
        },
    };
    info!(output = %output.display(), entries, "Packed");
    Ok(Packed { path: output, entries, manifest: prepared.manifest, generated_manifest: prepared.generated })
}

/// Absolute, canonical include path inside the project.
fn resolve_include(project: &Project, include: &Path) -> Result<PathBuf> {
    let path = project.dir().join(include);
    match fs::canonicalize(&path) {
        Ok(path) => Ok(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => exn::bail!(ErrorKind::MissingPath(path)),
        Err(e) => exn::bail!(ErrorKind::Io(e)),
    }
}

fn write_archive(output: &Path, manifest: &[u8], dist: &Path, includes: &[PathBuf], base: &Path) -> Result<usize> {
    let mut writer = ArchiveWriter::create(output).or_raise(|| ErrorKind::Archive)?;
    writer.add_file(MANIFEST_FILE, manifest).or_raise(|| ErrorKind::Archive)?;
    writer.add_path(dist, base).or_raise(|| ErrorKind::Archive)?;
    for include in includes {
        writer.add_path(include, base).or_raise(|| ErrorKind::Archive)?;
    }
    let entries = writer.entries();
    writer.finish().or_raise(|| ErrorKind::Archive)?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Read;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"name": "notes", "version": "1.0.0"}"#).unwrap();
        fs::create_dir_all(dir.path().join("dist/assets")).unwrap();
        fs::write(dir.path().join("dist/index.html"), b"<!DOCTYPE html>").unwrap();
        fs::write(dir.path().join("dist/assets/app.js"), b"app()").unwrap();
        fs::write(dir.path().join("LICENSE"), b"MIT").unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.ts"), b"not packed").unwrap();
        dir
    }

    fn archive_contents(path: &Path) -> Vec<(String, Vec<u8>)> {
        let mut zip = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut contents: Vec<_> = (0..zip.len())
            .map(|i| {
                let mut entry = zip.by_index(i).unwrap();
                let mut data = Vec::new();
                entry.read_to_end(&mut data).unwrap();
                (entry.name().to_string(), data)
            })
            .collect();
        contents.sort();
        contents
    }

    #[test]
    fn test_archive_layout() {
        let dir = project();
        let options = PackOptions { include: vec![PathBuf::from("LICENSE")], ..PackOptions::new(dir.path()) };
        let packed = pack(&options).unwrap();

        assert_eq!(packed.path, fs::canonicalize(dir.path()).unwrap().join("notes.tapp"));
        assert_eq!(packed.entries, 4);
        assert!(packed.generated_manifest);
        let contents = archive_contents(&packed.path);
        let names: Vec<_> = contents.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["LICENSE", "dist/assets/app.js", "dist/index.html", "tapp.json"]);
        let manifest = Manifest::from_slice(&contents[3].1).unwrap();
        assert_eq!(manifest, packed.manifest);
        assert_eq!(manifest.name.as_deref(), Some("notes"));
        // Nothing temporary is left in the project.
        assert!(!dir.path().join("tapp.json").exists());
    }

    #[test]
    fn test_existing_manifest_and_explicit_output() {
        let dir = project();
        fs::write(dir.path().join("tapp.json"), br#"{"name": "Hand Made", "entry": "dist/index.html"}"#).unwrap();
        let out = dir.path().join("build/out.zip");
        let options = PackOptions { out: Some(out), ..PackOptions::new(dir.path()) };
        let packed = pack(&options).unwrap();

        assert_eq!(packed.path, dir.path().join("build/out.tapp"));
        assert!(!packed.generated_manifest);
        let contents = archive_contents(&packed.path);
        let (name, data) = contents.last().unwrap();
        assert_eq!(name, "tapp.json");
        assert_eq!(data, br#"{"name": "Hand Made", "entry": "dist/index.html"}"#);
    }

    #[test]
    fn test_default_name_comes_from_existing_manifest() {
        let dir = project();
        fs::write(dir.path().join("tapp.json"), br#"{"name": "Graph Wars"}"#).unwrap();
        let packed = pack(&PackOptions::new(dir.path())).unwrap();
        assert!(packed.path.ends_with("GraphWars.tapp"));
    }

    #[test]
    fn test_missing_dist() {
        let dir = project();
        fs::remove_dir_all(dir.path().join("dist")).unwrap();
        let err = pack(&PackOptions::new(dir.path())).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MissingDist(_)));
    }

    #[test]
    fn test_missing_include_writes_nothing() {
        let dir = project();
        let options = PackOptions { include: vec![PathBuf::from("assets")], ..PackOptions::new(dir.path()) };
        let err = pack(&options).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MissingPath(_)));
        assert!(!dir.path().join("notes.tapp").exists());
    }

    #[test]
    fn test_include_outside_project_fails_cleanly() {
        let dir = project();
        let elsewhere = tempfile::tempdir().unwrap();
        fs::write(elsewhere.path().join("stray.txt"), b"nope").unwrap();
        let options = PackOptions { include: vec![elsewhere.path().to_path_buf()], ..PackOptions::new(dir.path()) };
        let err = pack(&options).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Archive));
        assert!(!dir.path().join("notes.tapp").exists());
    }
}
