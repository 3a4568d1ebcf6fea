//! Entry point resolution.
//!
//! The entry comes from the manifest, which comes from the package, which is
//! untrusted. Whatever it says, the result must be an existing regular file
//! inside the package root.

use crate::error::{ErrorKind, Result};
use derive_more::Display;
use exn::ResultExt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tapp_manifest::Manifest;
use tracing::instrument;

/// Entry used when the manifest has none and there's no `dist/index.html`.
pub const DEFAULT_ENTRY: &str = "index.html";
/// Entry used when the manifest has none and the package follows the
/// bundler convention.
pub const DIST_ENTRY: &str = "dist/index.html";

/// A forward-slash separated path, relative to the package root, naming an
/// existing regular file inside it.
///
/// Only [`resolve`] creates these.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash)]
#[display("{_0}")]
pub struct ResolvedEntry(String);

impl ResolvedEntry {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ResolvedEntry {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Work out which file inside `root` should be rendered first.
///
/// The manifest's `entry` wins when it's set and not blank. Otherwise
/// `dist/index.html` is used if it exists, and `index.html` if not.
///
/// Fails with [`PathEscape`](ErrorKind::PathEscape) if the entry (after
/// collapsing `.` and `..`, or by following a symlink) lands outside `root`,
/// and with [`EntryNotFound`](ErrorKind::EntryNotFound) if it isn't a file.
#[instrument(skip_all, fields(root = %root.display(), entry))]
pub fn resolve(root: &Path, manifest: &Manifest) -> Result<ResolvedEntry> {
    let root = fs::canonicalize(root).map_err(ErrorKind::Io)?;
    let candidate = candidate(&root, manifest);
    tracing::Span::current().record("entry", candidate.as_str());

    let resolved = normalize(&root.join(&candidate));
    if !resolved.starts_with(&root) {
        exn::bail!(ErrorKind::PathEscape(candidate));
    }
    if !resolved.is_file() {
        exn::bail!(ErrorKind::EntryNotFound { entry: candidate, path: resolved });
    }
    // Lexically inside, but a symlink could still point anywhere.
    let real = fs::canonicalize(&resolved).map_err(ErrorKind::Io)?;
    if !real.starts_with(&root) {
        exn::bail!(ErrorKind::PathEscape(candidate));
    }

    let relative = resolved.strip_prefix(&root).or_raise(|| ErrorKind::PathEscape(candidate.clone()))?;
    let segments: Vec<_> = relative.components().map(|c| c.as_os_str().to_string_lossy()).collect();
    Ok(ResolvedEntry(segments.join("/")))
}

fn candidate(root: &Path, manifest: &Manifest) -> String {
    match manifest.entry.as_deref() {
        Some(entry) if !entry.trim().is_empty() => entry.replace('\\', "/"),
        _ if root.join(DIST_ENTRY).is_file() => DIST_ENTRY.to_string(),
        _ => DEFAULT_ENTRY.to_string(),
    }
}

/// Collapses `.` and `..` without touching the filesystem. `..` at the root
/// stays at the root, the same as the OS does.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                normalized.pop();
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn package(files: &[&str]) -> TempDir {
        let root = tempfile::tempdir().unwrap();
        for file in files {
            let path = root.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, b"<!DOCTYPE html>").unwrap();
        }
        root
    }

    fn with_entry(entry: &str) -> Manifest {
        Manifest { entry: Some(entry.to_string()), ..Default::default() }
    }

    #[test]
    fn test_dist_convention() {
        let root = package(&["dist/index.html", "index.html"]);
        let entry = resolve(root.path(), &Manifest::default()).unwrap();
        assert_eq!(entry.as_str(), "dist/index.html");
    }

    #[test]
    fn test_root_index_fallback() {
        let root = package(&["index.html"]);
        assert_eq!(resolve(root.path(), &Manifest::default()).unwrap().as_str(), "index.html");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn test_blank_entry_uses_convention(#[case] entry: &str) {
        let root = package(&["dist/index.html"]);
        assert_eq!(resolve(root.path(), &with_entry(entry)).unwrap().as_str(), "dist/index.html");
    }

    #[rstest]
    #[case("app/start.html", "app/start.html")]
    #[case("./app/./start.html", "app/start.html")]
    #[case("app/../app/start.html", "app/start.html")]
    #[case("app//start.html", "app/start.html")]
    #[case("app\\start.html", "app/start.html")]
    fn test_manifest_entry_is_normalized(#[case] entry: &str, #[case] expected: &str) {
        let root = package(&["app/start.html", "dist/index.html"]);
        assert_eq!(resolve(root.path(), &with_entry(entry)).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("../../etc/passwd")]
    #[case("..\\..\\etc\\passwd")]
    #[case("dist/../../outside.html")]
    #[case("/etc/passwd")]
    fn test_path_escape(#[case] entry: &str) {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("pkg");
        fs::create_dir_all(root.join("dist")).unwrap();
        fs::write(outer.path().join("outside.html"), b"secret").unwrap();
        let before: Vec<_> = fs::read_dir(&root).unwrap().map(|e| e.unwrap().path()).collect();

        let err = resolve(&root, &with_entry(entry)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::PathEscape(_)), "{entry}: {err:?}");
        let after: Vec<_> = fs::read_dir(&root).unwrap().map(|e| e.unwrap().path()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_sibling_with_shared_prefix_escapes() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("pkg");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(outer.path().join("pkg-evil")).unwrap();
        fs::write(outer.path().join("pkg-evil/index.html"), b"evil").unwrap();
        let err = resolve(&root, &with_entry("../pkg-evil/index.html")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::PathEscape(_)));
    }

    #[test]
    fn test_missing_entry_names_the_path() {
        let root = package(&["index.html"]);
        let err = resolve(root.path(), &with_entry("start.html")).unwrap_err();
        match &*err {
            ErrorKind::EntryNotFound { entry, path } => {
                assert_eq!(entry, "start.html");
                assert_eq!(path, &fs::canonicalize(root.path()).unwrap().join("start.html"));
            },
            other => panic!("expected EntryNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_package_has_no_entry() {
        let root = package(&[]);
        let err = resolve(root.path(), &Manifest::default()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::EntryNotFound { entry, .. } if entry == "index.html"));
    }

    #[test]
    fn test_directory_is_not_an_entry() {
        let root = package(&["dist/index.html"]);
        let err = resolve(root.path(), &with_entry("dist")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::EntryNotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_out_of_root_escapes() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("pkg");
        fs::create_dir_all(&root).unwrap();
        fs::write(outer.path().join("secret.html"), b"secret").unwrap();
        std::os::unix::fs::symlink(outer.path().join("secret.html"), root.join("index.html")).unwrap();
        let err = resolve(&root, &Manifest::default()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::PathEscape(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_within_root_is_allowed() {
        let root = package(&["dist/real.html"]);
        std::os::unix::fs::symlink(root.path().join("dist/real.html"), root.path().join("index.html")).unwrap();
        assert_eq!(resolve(root.path(), &Manifest::default()).unwrap().as_str(), "index.html");
    }
}
