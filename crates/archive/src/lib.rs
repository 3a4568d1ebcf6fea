//! Reading and writing `.tapp` archives.
//!
//! A `.tapp` file is a plain zip archive. Extraction refuses any entry whose
//! name would resolve outside the extraction target, before a single byte is
//! written.

pub mod error;
mod extract;
mod path;
mod write;

pub use crate::extract::{Extracted, extract_into};
pub use crate::path::{archive_name, normalize, normalize_entry_name, validate as validate_path};
pub use crate::write::ArchiveWriter;
