//! XMind package writing functionality.
//!
//! This module creates `.xmind` files as ZIP archives: every member added
//! through [`PackageWriter`] is recorded in the manifest, which is written
//! last by [`PackageWriter::finish`].

use crate::common::Result;
use crate::xmind::constants::{MANIFEST_XML, MEDIA_TYPE_UNKNOWN, MEDIA_TYPE_XML, META_INF_DIR};
use crate::xmind::core::manifest::Manifest;
use std::io::{Seek, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

/// Builder for XMind packages (ZIP archives)
///
/// # Examples
///
/// ```
/// # use loquat::xmind::core::PackageWriter;
/// # fn example() -> loquat::Result<()> {
/// let mut writer = PackageWriter::new();
/// writer.add_file("content.xml", b"<xmap-content/>", "text/xml")?;
/// writer.add_file("attachments/a.txt", b"hello", "")?;
///
/// let bytes = writer.finish_to_bytes()?;
/// assert!(!bytes.is_empty());
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct PackageWriter<W: Write + Seek> {
    zip_writer: ZipWriter<W>,
    manifest: Manifest,
}

impl PackageWriter<std::io::Cursor<Vec<u8>>> {
    /// Create a new package writer that writes to memory
    pub fn new() -> Self {
        Self::with_writer(std::io::Cursor::new(Vec::new()))
    }

    /// Finish writing and return the bytes
    pub fn finish_to_bytes(self) -> Result<Vec<u8>> {
        let cursor = self.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for PackageWriter<std::io::Cursor<Vec<u8>>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Seek> PackageWriter<W> {
    /// Create a new package writer with a custom writer
    pub fn with_writer(writer: W) -> Self {
        Self {
            zip_writer: ZipWriter::new(writer),
            manifest: Manifest::new(),
        }
    }

    /// Add a file to the package and list it in the manifest.
    ///
    /// # Arguments
    ///
    /// * `path` - Path within the ZIP archive (e.g., "content.xml", "attachments/x.png")
    /// * `content` - File content as bytes
    /// * `media_type` - Media type for the manifest entry, empty when unknown
    pub fn add_file(&mut self, path: &str, content: &[u8], media_type: &str) -> Result<()> {
        self.manifest.push(path, media_type);

        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        self.zip_writer.start_file(path, options)?;
        self.zip_writer.write_all(content)?;

        Ok(())
    }

    /// Add a directory entry (path ending in `/`) to the package and the manifest.
    pub fn add_directory(&mut self, path: &str) -> Result<()> {
        self.manifest.push(path, MEDIA_TYPE_UNKNOWN);
        self.zip_writer
            .add_directory(path, SimpleFileOptions::default())?;
        Ok(())
    }

    /// List a path in the manifest without writing a member for it.
    ///
    /// Used for directory prefixes that only exist implicitly in the archive.
    pub fn declare(&mut self, path: &str, media_type: &str) {
        self.manifest.push(path, media_type);
    }

    /// The manifest assembled so far
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Finish writing the package and return the underlying writer
    ///
    /// This writes `META-INF/manifest.xml` listing every member added so far
    /// (plus the manifest itself) and finalizes the ZIP archive.
    pub fn finish(mut self) -> Result<W> {
        self.manifest.push(META_INF_DIR, MEDIA_TYPE_UNKNOWN);
        self.manifest.push(MANIFEST_XML, MEDIA_TYPE_XML);

        let manifest_content = self.manifest.to_xml();
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        self.zip_writer.start_file(MANIFEST_XML, options)?;
        self.zip_writer.write_all(manifest_content.as_bytes())?;

        let writer = self.zip_writer.finish()?;
        Ok(writer)
    }
}
