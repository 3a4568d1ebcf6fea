//! The `tapp.json` manifest: what it contains, how it's parsed, and where
//! it's loaded from.
//!
//! Parsing is forgiving about *shape* (key case, unknown keys and missing
//! fields) and strict about *values*: a field that is present must
//! have the right type.

pub mod error;
mod manifest;
mod parse;
mod store;

pub use crate::manifest::{DEFAULT_HEIGHT, DEFAULT_TITLE, DEFAULT_WIDTH, DebugConfig, Manifest, WindowConfig};
pub use crate::parse::ParseOptions;
pub use crate::store::{MANIFEST_FILE, ManifestStore};
