//! Archive creation.

use crate::error::{ErrorKind, Result};
use crate::path::archive_name;
use exn::ResultExt;
use std::fs::File;
use std::io::{self, Seek, Write};
use std::path::Path;
use tracing::instrument;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Builds a `.tapp` archive entry by entry.
///
/// Entry names are validated with the same rules used during extraction, so
/// anything written here can be extracted again.
pub struct ArchiveWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    entries: usize,
}

impl ArchiveWriter<File> {
    /// Create (or truncate) the archive file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path.as_ref()).map_err(ErrorKind::Io)?;
        Ok(Self::new(file))
    }
}

impl<W: Write + Seek> ArchiveWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { zip: ZipWriter::new(inner), entries: 0 }
    }

    fn options() -> SimpleFileOptions {
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
    }

    /// Number of file entries written so far.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Write an in-memory file under `name`.
    pub fn add_file(&mut self, name: impl AsRef<Path>, data: &[u8]) -> Result<()> {
        let name = archive_name(name)?;
        self.zip.start_file(name, Self::options()).or_raise(|| ErrorKind::InvalidArchive)?;
        self.zip.write_all(data).map_err(ErrorKind::Io)?;
        self.entries += 1;
        Ok(())
    }

    /// Write a file, or every file below a directory, from disk.
    ///
    /// Archive names are the paths relative to `base`; `path` must be inside
    /// `base`. Directories are walked in file-name order so the same tree
    /// always produces the same archive. Returns the number of files added.
    #[instrument(skip_all, fields(path = %path.display(), base = %base.display()))]
    pub fn add_path(&mut self, path: &Path, base: &Path) -> Result<usize> {
        let mut added = 0;
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|e| ErrorKind::Io(io::Error::from(e)))?;
            if !entry.path().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(base)
                .or_raise(|| ErrorKind::InvalidPath(entry.path().to_path_buf()))?;
            let name = archive_name(relative)?;
            self.zip.start_file(name, Self::options()).or_raise(|| ErrorKind::InvalidArchive)?;
            let mut source = File::open(entry.path()).map_err(ErrorKind::Io)?;
            io::copy(&mut source, &mut self.zip).map_err(ErrorKind::Io)?;
            added += 1;
        }
        self.entries += added;
        Ok(added)
    }

    /// Write the central directory and hand back the underlying writer.
    pub fn finish(self) -> Result<W> {
        self.zip.finish().or_raise(|| ErrorKind::InvalidArchive)
    }
}
