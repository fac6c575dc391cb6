//! XMind package (ZIP archive) reading.
//!
//! [`Package`] wraps an open archive and classifies its members the way the
//! document loader consumes them.

use crate::common::{Error, Result};
use crate::xmind::constants::{
    ATTACHMENTS_DIR, CONTENT_XML, MANIFEST_XML, MARKERS_DIR, META_INF_DIR, META_XML, STYLES_XML,
    THUMBNAILS_DIR,
};
use crate::xmind::core::manifest::Manifest;
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Role of an archive member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind<'a> {
    /// `content.xml`
    Content,
    /// `styles.xml`
    Styles,
    /// A file under `attachments/`, carrying its name without the directory
    Attachment(&'a str),
    /// Anything under `markers/` (already embedded, not re-exposed)
    Marker,
    /// `meta.xml`, the manifest, thumbnails and directory entries
    Bookkeeping,
    /// Members this library does not know about
    Unknown,
}

impl<'a> MemberKind<'a> {
    /// Classify a member by its archive path.
    pub fn classify(name: &'a str) -> Self {
        match name {
            CONTENT_XML => MemberKind::Content,
            STYLES_XML => MemberKind::Styles,
            META_XML | MANIFEST_XML | META_INF_DIR => MemberKind::Bookkeeping,
            _ => {
                if let Some(short) = name.strip_prefix(ATTACHMENTS_DIR) {
                    if short.is_empty() || short.ends_with('/') {
                        MemberKind::Bookkeeping
                    } else {
                        MemberKind::Attachment(short)
                    }
                } else if name.starts_with(MARKERS_DIR) {
                    MemberKind::Marker
                } else if name.starts_with(THUMBNAILS_DIR) {
                    MemberKind::Bookkeeping
                } else {
                    MemberKind::Unknown
                }
            },
        }
    }
}

/// An XMind package (ZIP file containing XML documents)
pub struct Package<R> {
    archive: RefCell<zip::ZipArchive<R>>,
}

impl Package<BufReader<File>> {
    /// Open a package from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
            .map_err(|e| match e {
                Error::InvalidFile(_) => Error::InvalidFile(path.display().to_string()),
                other => other,
            })
    }
}

impl<R: Read + Seek> Package<R> {
    /// Open a package from a reader
    pub fn from_reader(reader: R) -> Result<Self> {
        let archive = zip::ZipArchive::new(reader)
            .map_err(|e| Error::InvalidFile(format!("not a ZIP archive: {}", e)))?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Names of all members in archive order
    pub fn member_names(&self) -> Vec<String> {
        self.archive
            .borrow()
            .file_names()
            .map(str::to_string)
            .collect()
    }

    /// Check if a member exists in the package
    pub fn has_file(&self, path: &str) -> bool {
        self.archive.borrow_mut().by_name(path).is_ok()
    }

    /// Read a member by path
    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive.by_name(path)?;
        let mut content = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut content)?;
        Ok(content)
    }

    /// Parse `META-INF/manifest.xml`, `None` when the package has none
    pub fn manifest(&self) -> Result<Option<Manifest>> {
        if !self.has_file(MANIFEST_XML) {
            return Ok(None);
        }
        let bytes = self.read(MANIFEST_XML)?;
        let text = std::str::from_utf8(&bytes)?;
        Manifest::parse(text).map(Some)
    }
}
