//! XMind document structure, creation, loading and saving.

use crate::common::{Error, IdGenerator, Result, unique_id};
use crate::xmind::constants::{
    ATTACHMENTS_DIR, CONTENT_XML, DEFAULT_STYLES_XML, MARKERS_DIR, MEDIA_TYPE_UNKNOWN,
    MEDIA_TYPE_XML, META_FILE_CONTENT, META_XML, STYLES_XML, XMAP_VERSION,
};
use crate::xmind::core::{MemberKind, Package, PackageWriter};
use crate::xmind::elements::namespace::{
    CONTENT_NAMESPACES, CONTENT_NS, QualifiedName, STYLE_NAMESPACES, STYLE_NS,
};
use crate::xmind::elements::{CONSTRUCTING, NAVIGATING, NodeId, TagResolver, XmlTree};
use crate::xmind::sheet::{Sheet, SheetMut};
use crate::xmind::style::{StyleId, StyleSpec, TopicStyle};
use crate::xmind::topic::{Topic, TopicKey, TopicMut};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};

/// Settings applied when a document is created or opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Width of every generated element id
    pub id_length: usize,
}

impl DocumentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use ids of `id_length` bytes instead of the default 26.
    pub fn with_id_length(mut self, id_length: usize) -> Self {
        self.id_length = id_length;
        self
    }
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            id_length: crate::common::id::DEFAULT_ID_LENGTH,
        }
    }
}

/// An XMind mind-map document (.xmind).
///
/// The document owns the structural tree (`content.xml`), the style tree
/// (`styles.xml`) and the attachment table. Sheets, topics, legends and
/// styles are views borrowing from it.
///
/// # Examples
///
/// ```
/// use loquat::xmind::Document;
///
/// # fn main() -> loquat::Result<()> {
/// let mut doc = Document::create("Plan", "Project")?;
/// {
///     let mut sheet = doc.first_sheet_mut()?;
///     let mut root = sheet.root_topic_mut()?;
///     root.add_subtopic("Design", None, false)?;
///     root.add_subtopic("Parking lot", None, true)?;
/// }
///
/// let root = doc.first_sheet()?.root_topic()?;
/// let titles: Vec<String> = root
///     .subtopics(false)?
///     .map(|topic| topic.title().map(|t| t.into_owned()))
///     .collect::<loquat::Result<_>>()?;
/// assert_eq!(titles, ["Design"]);
/// # Ok(())
/// # }
/// ```
pub struct Document {
    content: XmlTree,
    styles: XmlTree,
    attachments: BTreeMap<String, Bytes>,
    embedded_markers: Option<PathBuf>,
    ids: IdGenerator,
    resolver: &'static dyn TagResolver,
}

impl Document {
    /// Create a new document holding one sheet with a root topic.
    pub fn create(sheet_title: &str, root_title: &str) -> Result<Self> {
        Self::create_with_options(sheet_title, root_title, DocumentOptions::default())
    }

    /// Create a new document with explicit options.
    pub fn create_with_options(
        sheet_title: &str,
        root_title: &str,
        options: DocumentOptions,
    ) -> Result<Self> {
        let mut content = XmlTree::new(
            QualifiedName::new(None, "xmap-content"),
            CONTENT_NS,
            CONTENT_NAMESPACES,
        );
        let root = content.root();
        content.set_attribute(root, "version", XMAP_VERSION);

        let mut styles = XmlTree::new(
            QualifiedName::new(None, "xmap-styles"),
            STYLE_NS,
            STYLE_NAMESPACES,
        );
        let root = styles.root();
        styles.set_attribute(root, "version", XMAP_VERSION);

        let mut doc = Self {
            content,
            styles,
            attachments: BTreeMap::new(),
            embedded_markers: None,
            ids: IdGenerator::with_length(options.id_length),
            resolver: &CONSTRUCTING,
        };
        doc.create_sheet(sheet_title, root_title)?;
        Ok(doc)
    }

    /// Open an XMind document from a file path.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidFile`] when the file is not a ZIP archive or carries no
    /// `content.xml`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, DocumentOptions::default())
    }

    /// Open an XMind document from a file path with explicit options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: DocumentOptions) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "opening document");
        Self::from_reader_with_options(BufReader::new(file), options)
    }

    /// Load a document from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, DocumentOptions::default())
    }

    /// Load a document from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    fn from_reader_with_options<R: Read + Seek>(reader: R, options: DocumentOptions) -> Result<Self> {
        let package = Package::from_reader(reader)?;

        let mut content = None;
        let mut styles = None;
        let mut attachments = BTreeMap::new();

        for name in package.member_names() {
            match MemberKind::classify(&name) {
                MemberKind::Content => content = Some(XmlTree::parse(&package.read(&name)?)?),
                MemberKind::Styles => styles = Some(XmlTree::parse(&package.read(&name)?)?),
                MemberKind::Attachment(short) => {
                    let data = package.read(&name)?;
                    tracing::debug!(name = short, size = data.len(), "loaded attachment");
                    attachments.insert(short.to_string(), Bytes::from(data));
                },
                MemberKind::Marker | MemberKind::Bookkeeping => {
                    tracing::trace!(member = %name, "skipping member");
                },
                MemberKind::Unknown => {
                    tracing::warn!(member = %name, "ignoring unknown package member");
                },
            }
        }

        let content = content
            .ok_or_else(|| Error::InvalidFile(format!("{} not found in package", CONTENT_XML)))?;
        let styles = match styles {
            Some(styles) => styles,
            None => {
                tracing::debug!("package has no {}, using an empty style tree", STYLES_XML);
                XmlTree::parse(DEFAULT_STYLES_XML.as_bytes())?
            },
        };

        let mut ids = IdGenerator::with_length(options.id_length);
        for tree in [&content, &styles] {
            for node in tree.descendants() {
                if let Some(id) = tree.attribute(node, "id") {
                    ids.observe(id);
                }
            }
        }
        // attachment names share the plain id counter
        for name in attachments.keys() {
            ids.observe(name.split_once('.').map_or(name.as_str(), |(stem, _)| stem));
        }

        Ok(Self {
            content,
            styles,
            attachments,
            embedded_markers: None,
            ids,
            resolver: &NAVIGATING,
        })
    }

    /// Save the document to a file path.
    ///
    /// The whole document is written in one pass; a failure part-way leaves a
    /// partial file behind.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let writer = self.write_package(PackageWriter::with_writer(BufWriter::new(file)))?;
        writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
        tracing::debug!(path = %path.as_ref().display(), "saved document");
        Ok(())
    }

    /// Serialize the document to an in-memory `.xmind` archive.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let cursor = self.write_package(PackageWriter::new())?;
        Ok(cursor.into_inner())
    }

    fn write_package<W: Write + Seek>(&self, mut writer: PackageWriter<W>) -> Result<W> {
        writer.add_file(CONTENT_XML, self.content.to_xml_string().as_bytes(), MEDIA_TYPE_XML)?;
        writer.add_file(STYLES_XML, self.styles.to_xml_string().as_bytes(), MEDIA_TYPE_XML)?;
        writer.add_file(META_XML, META_FILE_CONTENT.as_bytes(), MEDIA_TYPE_XML)?;

        for (name, data) in &self.attachments {
            let path = format!("{}{}", ATTACHMENTS_DIR, name);
            writer.add_file(&path, data, MEDIA_TYPE_UNKNOWN)?;
        }

        if let Some(markers) = &self.embedded_markers {
            self.copy_marker_package(&mut writer, markers)?;
        }

        writer.finish()
    }

    /// Re-home every member of a marker package under `markers/`.
    fn copy_marker_package<W: Write + Seek>(
        &self,
        writer: &mut PackageWriter<W>,
        source: &Path,
    ) -> Result<()> {
        let file = File::open(source)?;
        let mut archive = zip::ZipArchive::new(BufReader::new(file))?;
        writer.declare(MARKERS_DIR, MEDIA_TYPE_UNKNOWN);

        for index in 0..archive.len() {
            let mut member = archive.by_index(index)?;
            let path = format!("{}{}", MARKERS_DIR, member.name());
            if member.is_dir() {
                writer.add_directory(&path)?;
                continue;
            }
            let mut data = Vec::with_capacity(member.size() as usize);
            member.read_to_end(&mut data)?;
            writer.add_file(&path, &data, MEDIA_TYPE_UNKNOWN)?;
        }

        tracing::debug!(source = %source.display(), members = archive.len(), "embedded marker package");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Sheets
    // ------------------------------------------------------------------------

    /// Append a sheet with a fresh id, a title and a root topic.
    pub fn create_sheet(&mut self, title: &str, root_title: &str) -> Result<SheetMut<'_>> {
        let root = self.content.root();
        let sheet_id = self.ids.next_id(None)?;
        let sheet = self.create_child(root, "sheet");
        self.content.set_attribute(sheet, "id", &sheet_id);
        let title_node = self.create_child(sheet, "title");
        self.content.set_text(title_node, title);

        let topic_id = self.ids.next_id(None)?;
        let topic = self.create_child(sheet, "topic");
        self.content.set_attribute(topic, "id", &topic_id);
        let title_node = self.create_child(topic, "title");
        self.content.set_text(title_node, root_title);

        Ok(SheetMut::new(self, sheet))
    }

    /// All sheets in document order.
    pub fn sheets(&self) -> Vec<Sheet<'_>> {
        self.sheet_nodes()
            .into_iter()
            .map(|node| Sheet::new(self, node))
            .collect()
    }

    /// The first sheet.
    ///
    /// # Errors
    ///
    /// [`Error::MissingElement`] when the document holds no sheet.
    pub fn first_sheet(&self) -> Result<Sheet<'_>> {
        let node = self.first_sheet_node()?;
        Ok(Sheet::new(self, node))
    }

    /// The first sheet, for modification.
    pub fn first_sheet_mut(&mut self) -> Result<SheetMut<'_>> {
        let node = self.first_sheet_node()?;
        Ok(SheetMut::new(self, node))
    }

    /// Sheet at `index` in document order, for modification.
    pub fn sheet_mut(&mut self, index: usize) -> Option<SheetMut<'_>> {
        let node = self.sheet_nodes().get(index).copied()?;
        Some(SheetMut::new(self, node))
    }

    fn sheet_nodes(&self) -> Vec<NodeId> {
        self.resolver
            .find_children(&self.content, self.content.root(), "sheet")
    }

    fn first_sheet_node(&self) -> Result<NodeId> {
        let root = self.content.root();
        self.sheet_nodes()
            .first()
            .copied()
            .ok_or_else(|| Error::MissingElement {
                tag: "sheet".to_string(),
                parent: self.content.describe(root),
                known: String::new(),
            })
    }

    // ------------------------------------------------------------------------
    // Topics
    // ------------------------------------------------------------------------

    /// Re-enter a topic through a key obtained from one of its views.
    ///
    /// Keys are only meaningful for the document that produced them.
    pub fn topic(&self, key: TopicKey) -> Option<Topic<'_>> {
        self.is_topic(key.node()).then(|| Topic::new(self, key.node()))
    }

    /// Re-enter a topic for modification.
    pub fn topic_mut(&mut self, key: TopicKey) -> Option<TopicMut<'_>> {
        if self.is_topic(key.node()) {
            Some(TopicMut::new(self, key.node()))
        } else {
            None
        }
    }

    /// Find a topic by its canonical unique id (see [`unique_id`]).
    pub fn find_topic(&self, unique: &str) -> Option<Topic<'_>> {
        self.content
            .descendants()
            .into_iter()
            .filter(|node| self.is_topic(*node))
            .find(|node| {
                self.content
                    .attribute(*node, "id")
                    .is_some_and(|id| unique_id(id) == unique)
            })
            .map(|node| Topic::new(self, node))
    }

    fn is_topic(&self, node: NodeId) -> bool {
        self.content.contains(node)
            && self.content.parent(node).is_some()
            && self
                .content
                .name(node)
                .is_some_and(|name| name.local_name == "topic")
    }

    // ------------------------------------------------------------------------
    // Styles
    // ------------------------------------------------------------------------

    /// Add a topic style to the style tree and return its id.
    ///
    /// The style can be assigned right away with
    /// [`TopicMut::set_style`](crate::xmind::TopicMut::set_style).
    pub fn create_topic_style(&mut self, spec: &StyleSpec) -> Result<StyleId> {
        let id = self.ids.next_id(None)?;
        let resolver = self.resolver;
        let root = self.styles.root();
        let container = resolver.find_or_create_child(&mut self.styles, root, "styles")?;

        let style = resolver.create_child(&mut self.styles, container, "style");
        self.styles.set_attribute(style, "id", &id);
        self.styles.set_attribute(style, "type", "topic");

        let properties = resolver.create_child(&mut self.styles, style, "topic-properties");
        self.styles.set_attribute(properties, "line-color", &spec.line_color);
        self.styles.set_attribute(properties, "line-width", &spec.line_width);
        self.styles.set_attribute(properties, "shape-class", &spec.shape);
        self.styles.set_attribute(properties, "svg:fill", &spec.fill);

        Ok(StyleId::new(id))
    }

    /// Look up a style record by id.
    pub fn topic_style(&self, id: &str) -> Result<Option<TopicStyle<'_>>> {
        let root = self.styles.root();
        let Some(container) = self
            .resolver
            .find_only_child(&self.styles, root, "styles", false)?
        else {
            return Ok(None);
        };
        let style = self
            .resolver
            .find_only_child_where(&self.styles, container, "style", "id", id, false)?;
        Ok(style.map(|node| TopicStyle::new(self, node)))
    }

    // ------------------------------------------------------------------------
    // Attachments and markers
    // ------------------------------------------------------------------------

    /// Embed a marker package (an `.xmp` export) when saving.
    ///
    /// The file is read at save time. A later call replaces the earlier one.
    pub fn embed_markers<P: Into<PathBuf>>(&mut self, path: P) {
        self.embedded_markers = Some(path.into());
    }

    /// Names of all attachments, sorted.
    pub fn attachment_names(&self) -> impl Iterator<Item = &str> {
        self.attachments.keys().map(String::as_str)
    }

    /// Body of an attachment.
    pub fn attachment(&self, name: &str) -> Option<&Bytes> {
        self.attachments.get(name)
    }

    /// Serialized `content.xml`.
    pub fn content_xml(&self) -> String {
        self.content.to_xml_string()
    }

    /// Serialized `styles.xml`.
    pub fn styles_xml(&self) -> String {
        self.styles.to_xml_string()
    }

    // ------------------------------------------------------------------------
    // Access for views
    // ------------------------------------------------------------------------

    pub(crate) fn content(&self) -> &XmlTree {
        &self.content
    }

    pub(crate) fn content_mut(&mut self) -> &mut XmlTree {
        &mut self.content
    }

    pub(crate) fn styles(&self) -> &XmlTree {
        &self.styles
    }

    pub(crate) fn resolver(&self) -> &'static dyn TagResolver {
        self.resolver
    }

    pub(crate) fn next_id(&mut self, external: Option<&str>) -> Result<String> {
        self.ids.next_id(external)
    }

    pub(crate) fn insert_attachment(&mut self, name: String, data: Bytes) -> Result<()> {
        match self.attachments.entry(name) {
            Entry::Occupied(entry) => Err(Error::DuplicateAttachment(entry.key().clone())),
            Entry::Vacant(entry) => {
                tracing::debug!(name = %entry.key(), size = data.len(), "registered attachment");
                entry.insert(data);
                Ok(())
            },
        }
    }

    /// Create a content element under `parent`.
    pub(crate) fn create_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.resolver.create_child(&mut self.content, parent, name)
    }

    /// Follow `path` from `parent` through optional single children.
    pub(crate) fn find_path(&self, parent: NodeId, path: &[&str]) -> Result<Option<NodeId>> {
        let mut current = parent;
        for name in path {
            match self
                .resolver
                .find_only_child(&self.content, current, name, false)?
            {
                Some(child) => current = child,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Follow `path` from `parent`, creating missing elements.
    pub(crate) fn ensure_path(&mut self, parent: NodeId, path: &[&str]) -> Result<NodeId> {
        let mut current = parent;
        for name in path {
            current = self
                .resolver
                .find_or_create_child(&mut self.content, current, name)?;
        }
        Ok(current)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("sheets", &self.sheet_nodes().len())
            .field("attachments", &self.attachments.len())
            .field("embedded_markers", &self.embedded_markers)
            .field("resolver", &self.resolver)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_builds_one_sheet() {
        let doc = Document::create("S1", "Root").unwrap();
        let sheets = doc.sheets();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].title().unwrap(), "S1");
        assert_eq!(sheets[0].id(), "bfbf0000000000000000000001");

        let root = sheets[0].root_topic().unwrap();
        assert_eq!(root.title().unwrap(), "Root");
        assert_eq!(root.id(), "bfbf0000000000000000000002");

        let xml = doc.content_xml();
        assert!(xml.contains(r#"<xmap-content xmlns="urn:xmind:xmap:xmlns:content:2.0""#));
        assert!(xml.contains(r#"version="2.0""#));
    }

    #[test]
    fn test_create_sheet_appends() {
        let mut doc = Document::create("S1", "Root").unwrap();
        doc.create_sheet("S2", "Other").unwrap();
        let titles: Vec<String> = doc
            .sheets()
            .iter()
            .map(|sheet| sheet.title().unwrap().into_owned())
            .collect();
        assert_eq!(titles, ["S1", "S2"]);
        assert_eq!(doc.first_sheet().unwrap().title().unwrap(), "S1");
        assert_eq!(
            doc.sheet_mut(1).unwrap().as_sheet().title().unwrap(),
            "S2"
        );
        assert!(doc.sheet_mut(2).is_none());
    }

    #[test]
    fn test_topic_keys_reenter_views() {
        let mut doc = Document::create("S1", "Root").unwrap();
        let key = {
            let mut sheet = doc.first_sheet_mut().unwrap();
            let mut root = sheet.root_topic_mut().unwrap();
            root.add_subtopic("Child", None, false).unwrap().key()
        };
        assert_eq!(doc.topic(key).unwrap().title().unwrap(), "Child");
        doc.topic_mut(key).unwrap().set_title("Renamed").unwrap();
        assert_eq!(doc.topic(key).unwrap().title().unwrap(), "Renamed");
    }

    #[test]
    fn test_topic_style_lookup() {
        let mut doc = Document::create("S1", "Root").unwrap();
        assert!(doc.topic_style("missing").unwrap().is_none());

        let id = doc
            .create_topic_style(&StyleSpec::new("#37D02B"))
            .unwrap();
        let style = doc.topic_style(id.as_str()).unwrap().unwrap();
        assert_eq!(style.id(), id.as_str());
        assert_eq!(style.fill().unwrap(), Some("#37D02B"));

        let xml = doc.styles_xml();
        assert!(xml.contains(r#"<style id=""#));
        assert!(xml.contains(r##"svg:fill="#37D02B""##));
    }

    #[test]
    fn test_documents_have_independent_id_streams() {
        let first = Document::create("A", "Root").unwrap();
        let second = Document::create("B", "Root").unwrap();
        assert_eq!(
            first.first_sheet().unwrap().id(),
            second.first_sheet().unwrap().id()
        );
    }

    #[test]
    fn test_custom_id_length() {
        let doc = Document::create_with_options(
            "S1",
            "Root",
            DocumentOptions::new().with_id_length(12),
        )
        .unwrap();
        assert_eq!(doc.first_sheet().unwrap().id(), "bfbf00000001");
    }

    #[test]
    fn test_first_sheet_of_empty_content_is_structural_error() {
        let mut writer = PackageWriter::new();
        writer
            .add_file(
                CONTENT_XML,
                br#"<xmap-content xmlns="urn:xmind:xmap:xmlns:content:2.0" version="2.0"/>"#,
                MEDIA_TYPE_XML,
            )
            .unwrap();
        let bytes = writer.finish_to_bytes().unwrap();
        let doc = Document::from_bytes(&bytes).unwrap();
        assert!(doc.first_sheet().unwrap_err().is_structural());
        assert!(doc.sheets().is_empty());
    }

    #[test]
    fn test_attachment_names_are_not_reused() {
        let mut doc = Document::create("S1", "Root").unwrap();
        doc.insert_attachment("a.txt".to_string(), Bytes::from_static(b"one")).unwrap();
        let err = doc
            .insert_attachment("a.txt".to_string(), Bytes::from_static(b"two"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateAttachment(ref name) if name == "a.txt"));
        assert_eq!(doc.attachment("a.txt").unwrap()[..], b"one"[..]);
    }
}
