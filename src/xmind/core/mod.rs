//! Core XMind package functionality.
//!
//! This module handles the ZIP container an `.xmind` file is stored in:
//!
//! - [`Package`] reads an archive and classifies its members
//! - [`PackageWriter`] writes members and assembles the manifest
//! - [`Manifest`] is the structured form of `META-INF/manifest.xml`

/// Manifest parsing and serialization
mod manifest;
/// Package reading
mod package;
/// Package writing
mod writer;

pub use manifest::{Manifest, ManifestEntry};
pub use package::{MemberKind, Package};
pub use writer::PackageWriter;
