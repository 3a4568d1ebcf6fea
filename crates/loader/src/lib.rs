//! Opening `.tapp` packages.
//!
//! [`Loader::open`] ties the pieces together: the package is extracted (or
//! found) in the [`PackageCache`](tapp_cache::PackageCache), its manifest is
//! loaded, and its entry point is resolved and checked to stay inside the
//! package. The result is a [`LoadedPackage`] or an error, never both.

pub mod error;
mod open;
mod resolve;

pub use crate::open::{DEFAULT_VIRTUAL_HOST, LoadedPackage, Loader};
pub use crate::resolve::{DEFAULT_ENTRY, DIST_ENTRY, ResolvedEntry, resolve};
