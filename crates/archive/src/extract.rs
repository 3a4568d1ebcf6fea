//! Archive extraction.

use crate::error::{ErrorKind, Result};
use crate::path::normalize_entry_name;
use exn::ResultExt;
use std::fs::{self, File};
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::instrument;
use zip::ZipArchive;
use zip::result::{ZipError, ZipResult};

/// Summary of a completed extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extracted {
    /// Regular files written (duplicate entries are counted every time).
    pub files: usize,
    /// Directory entries created.
    pub directories: usize,
}

struct PlannedEntry {
    index: usize,
    relative: PathBuf,
    is_dir: bool,
}

/// Extracts every entry of a zip archive into `target`.
///
/// All entry names are validated before anything is written, so an archive
/// containing a single zip-slip entry (`../x`, `/etc/x`, `..\x`) fails with
/// [`UnsafeEntry`](ErrorKind::UnsafeEntry) without touching the disk.
/// Existing files are truncated and overwritten, which makes re-running an
/// interrupted extraction into the same directory safe.
///
/// `target` is created if it does not exist.
#[instrument(skip_all, fields(target = %target.display(), files, directories))]
pub fn extract_into<R: Read + Seek>(archive: R, target: &Path) -> Result<Extracted> {
    let mut zip = zip_result(ZipArchive::new(archive))?;
    let plan = plan(&mut zip)?;

    fs::create_dir_all(target).map_err(ErrorKind::Io)?;
    let mut summary = Extracted::default();
    for entry in plan {
        let destination = target.join(&entry.relative);
        if entry.is_dir {
            fs::create_dir_all(&destination).map_err(ErrorKind::Io)?;
            summary.directories += 1;
            continue;
        }
        // Archives aren't required to contain entries for parent directories.
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(ErrorKind::Io)?;
        }
        let mut source = zip_result(zip.by_index(entry.index))?;
        let mut file = File::create(&destination).map_err(ErrorKind::Io)?;
        match io::copy(&mut source, &mut file) {
            Ok(_) => summary.files += 1,
            // Checksum mismatches and broken deflate streams surface as InvalidData.
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(e).or_raise(|| ErrorKind::InvalidArchive);
            },
            Err(e) => exn::bail!(ErrorKind::Io(e)),
        }
    }

    let span = tracing::Span::current();
    span.record("files", summary.files);
    span.record("directories", summary.directories);
    Ok(summary)
}

/// First pass over the central directory: resolve every entry name without
/// reading any entry data.
fn plan<R: Read + Seek>(zip: &mut ZipArchive<R>) -> Result<Vec<PlannedEntry>> {
    let mut plan = Vec::with_capacity(zip.len());
    for index in 0..zip.len() {
        let entry = zip_result(zip.by_index_raw(index))?;
        let name = entry.name().to_string();
        let is_dir = entry.is_dir();
        let relative = normalize_entry_name(&name).or_raise(|| ErrorKind::UnsafeEntry(name.clone()))?;
        if relative.as_os_str().is_empty() {
            // "./" as a directory entry is just the root itself.
            if is_dir {
                continue;
            }
            exn::bail!(ErrorKind::UnsafeEntry(name));
        }
        plan.push(PlannedEntry { index, relative, is_dir });
    }
    Ok(plan)
}

fn zip_result<T>(result: ZipResult<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(ZipError::Io(e)) => exn::bail!(ErrorKind::Io(e)),
        Err(e) => Err(e).or_raise(|| ErrorKind::InvalidArchive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn archive(entries: &[(&str, &str)]) -> Cursor<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, SimpleFileOptions::default()).unwrap();
            } else {
                writer.start_file(*name, SimpleFileOptions::default()).unwrap();
                writer.write_all(data.as_bytes()).unwrap();
            }
        }
        let mut cursor = writer.finish().unwrap();
        cursor.set_position(0);
        cursor
    }

    #[test]
    fn test_extracts_nested_tree() {
        let temp_dir = tempfile::tempdir().unwrap();
        let zip = archive(&[
            ("tapp.json", "{}"),
            ("dist/", ""),
            ("dist/index.html", "<!DOCTYPE html>"),
            ("dist/assets/app.js", "console.log(1)"),
        ]);
        let summary = extract_into(zip, temp_dir.path()).unwrap();
        assert_eq!(summary, Extracted { files: 3, directories: 1 });
        assert_eq!(fs::read(temp_dir.path().join("dist/index.html")).unwrap(), b"<!DOCTYPE html>");
        assert_eq!(fs::read(temp_dir.path().join("dist/assets/app.js")).unwrap(), b"console.log(1)");
    }

    #[test]
    fn test_backslash_entries_become_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let zip = archive(&[("dist\\index.html", "windows")]);
        extract_into(zip, temp_dir.path()).unwrap();
        assert_eq!(fs::read(temp_dir.path().join("dist").join("index.html")).unwrap(), b"windows");
    }

    #[test]
    fn test_overwrites_existing_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("index.html"), b"a much longer partially written file").unwrap();
        extract_into(archive(&[("index.html", "short")]), temp_dir.path()).unwrap();
        assert_eq!(fs::read(temp_dir.path().join("index.html")).unwrap(), b"short");
    }

    #[test]
    fn test_zip_slip_writes_nothing() {
        let outer = tempfile::tempdir().unwrap();
        let target = outer.path().join("target");
        // The safe entry comes first: validation must still happen up front.
        let zip = archive(&[("index.html", "fine"), ("../evil.txt", "gotcha")]);
        let err = extract_into(zip, &target).unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsafeEntry(name) if name == "../evil.txt"));
        assert!(!outer.path().join("evil.txt").exists());
        assert!(!target.exists());
    }

    #[test]
    fn test_absolute_entry_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = extract_into(archive(&[("/tmp/evil.txt", "gotcha")]), temp_dir.path()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsafeEntry(_)));
    }

    #[test]
    fn test_not_a_zip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = extract_into(Cursor::new(b"definitely not a zip file".to_vec()), temp_dir.path()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidArchive));
    }
}
