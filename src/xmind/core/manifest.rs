//! XMind manifest (`META-INF/manifest.xml`).
//!
//! The manifest enumerates every package member with a media type. It is
//! assembled as a list of entries while the package is written and serialized
//! once at the end.

use crate::common::xml::{escape_xml, unescape_xml};
use crate::common::{Error, Result};
use crate::xmind::elements::element::XML_DECLARATION;
use crate::xmind::elements::namespace::MANIFEST_NS;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Entry in the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub full_path: String,
    pub media_type: String,
}

impl ManifestEntry {
    pub fn new(full_path: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            full_path: full_path.into(),
            media_type: media_type.into(),
        }
    }
}

/// Ordered list of manifest entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; a path already listed keeps its first entry.
    pub fn push(&mut self, full_path: &str, media_type: &str) {
        if !self.has_path(full_path) {
            self.entries.push(ManifestEntry::new(full_path, media_type));
        }
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Get media type for a path
    pub fn media_type(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.full_path == path)
            .map(|entry| entry.media_type.as_str())
    }

    /// Check if a path exists in manifest
    pub fn has_path(&self, path: &str) -> bool {
        self.entries.iter().any(|entry| entry.full_path == path)
    }

    /// All listed paths
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.full_path.as_str())
    }

    /// Serialize to `manifest.xml` content.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(128 + self.entries.len() * 64);
        xml.push_str(XML_DECLARATION);
        xml.push_str("\n<manifest xmlns=\"");
        xml.push_str(MANIFEST_NS);
        xml.push_str("\">\n");
        for entry in &self.entries {
            xml.push_str(&format!(
                "  <file-entry full-path=\"{}\" media-type=\"{}\"/>\n",
                escape_xml(&entry.full_path),
                escape_xml(&entry.media_type)
            ));
        }
        xml.push_str("</manifest>\n");
        xml
    }

    /// Parse manifest XML content
    pub fn parse(xml_content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml_content);
        let mut manifest = Manifest::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    if local_name(e) == b"file-entry"
                        && let Some(entry) = Self::parse_file_entry(e)?
                    {
                        manifest.entries.push(entry);
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlError(format!("Manifest parsing error: {}", e))),
                _ => {},
            }
        }

        Ok(manifest)
    }

    /// Parse a single file-entry element
    fn parse_file_entry(e: &BytesStart<'_>) -> Result<Option<ManifestEntry>> {
        let mut full_path = String::new();
        let mut media_type = String::new();

        for attr in e.attributes() {
            let attr = attr?;
            let value = unescape_xml(std::str::from_utf8(&attr.value)?);
            match attr.key.local_name().as_ref() {
                b"full-path" => full_path = value,
                b"media-type" => media_type = value,
                _ => {},
            }
        }

        if full_path.is_empty() {
            Ok(None)
        } else {
            Ok(Some(ManifestEntry {
                full_path,
                media_type,
            }))
        }
    }
}

fn local_name<'a>(e: &'a BytesStart<'_>) -> &'a [u8] {
    let name = e.name().into_inner();
    match name.iter().position(|b| *b == b':') {
        Some(colon) => &name[colon + 1..],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_serialization() {
        let mut manifest = Manifest::new();
        manifest.push("content.xml", "text/xml");
        manifest.push("attachments/a&b.txt", "");
        manifest.push("content.xml", "ignored");

        let xml = manifest.to_xml();
        assert!(xml.contains(r#"<manifest xmlns="urn:xmind:xmap:xmlns:manifest:1.0">"#));
        assert!(xml.contains(r#"<file-entry full-path="content.xml" media-type="text/xml"/>"#));
        assert!(xml.contains(r#"full-path="attachments/a&amp;b.txt" media-type="""#));
        assert_eq!(manifest.entries().len(), 2);
    }

    #[test]
    fn test_manifest_parse() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<manifest xmlns="urn:xmind:xmap:xmlns:manifest:1.0">
  <file-entry full-path="content.xml" media-type="text/xml"/>
  <file-entry full-path="META-INF/" media-type=""/>
  <file-entry full-path="Thumbnails/thumbnail.jpg" media-type="image/jpeg"/>
</manifest>"#;
        let manifest = Manifest::parse(xml).unwrap();
        assert_eq!(manifest.entries().len(), 3);
        assert_eq!(manifest.media_type("content.xml"), Some("text/xml"));
        assert_eq!(manifest.media_type("META-INF/"), Some(""));
        assert!(manifest.has_path("Thumbnails/thumbnail.jpg"));
        assert!(!manifest.has_path("styles.xml"));
    }

    #[test]
    fn test_manifest_reparses_own_output() {
        let mut manifest = Manifest::new();
        manifest.push("content.xml", "text/xml");
        manifest.push("markers/", "");
        let reparsed = Manifest::parse(&manifest.to_xml()).unwrap();
        assert_eq!(reparsed, manifest);
    }
}
