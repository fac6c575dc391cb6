//! Topic views.
//!
//! A topic keeps its children in two containers under `children`:
//! `topics[@type="attached"]` and `topics[@type="detached"]`. Each container
//! is created on the first insertion into it, and a child only ever lives in
//! the one it was inserted into.

use crate::common::{Result, qualify_id, unique_id};
use crate::xmind::constants::{
    ATTACHMENT_REF_PREFIX, ATTACHMENTS_DIR, ATTR_HREF, ATTR_STYLE_ID, TOPICS_ATTACHED,
    TOPICS_DETACHED, is_builtin_marker,
};
use crate::xmind::document::Document;
use crate::xmind::elements::{NodeId, QualifiedName};
use crate::xmind::style::StyleId;
use bytes::Bytes;
use std::borrow::Cow;

/// Stable handle on a topic, usable after the view it came from is dropped.
///
/// See [`Document::topic`] and [`Document::topic_mut`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TopicKey(NodeId);

impl TopicKey {
    pub(crate) fn node(self) -> NodeId {
        self.0
    }
}

fn partition(detached: bool) -> &'static str {
    if detached { TOPICS_DETACHED } else { TOPICS_ATTACHED }
}

/// Read-only view of a topic.
#[derive(Debug, Clone, Copy)]
pub struct Topic<'a> {
    doc: &'a Document,
    node: NodeId,
}

impl<'a> Topic<'a> {
    pub(crate) fn new(doc: &'a Document, node: NodeId) -> Self {
        Self { doc, node }
    }

    pub fn key(&self) -> TopicKey {
        TopicKey(self.node)
    }

    /// Internal element id.
    pub fn id(&self) -> &'a str {
        self.doc.content().attribute(self.node, "id").unwrap_or_default()
    }

    /// External id embedded into the element id, if any.
    pub fn embedded_id(&self) -> Option<&'a str> {
        qualify_id(self.id())
    }

    /// Canonical key for matching this topic across save/open cycles.
    pub fn unique_id(&self) -> &'a str {
        unique_id(self.id())
    }

    /// Topic title, empty when the topic has none.
    pub fn title(&self) -> Result<Cow<'a, str>> {
        Ok(self.text_at(&["title"])?.unwrap_or(Cow::Borrowed("")))
    }

    /// Children in one partition, in document order.
    ///
    /// Empty when the partition was never written to.
    pub fn subtopics(&self, detached: bool) -> Result<Subtopics<'a>> {
        let doc = self.doc;
        let container = match doc.find_path(self.node, &["children"])? {
            Some(children) => doc.resolver().find_only_child_where(
                doc.content(),
                children,
                "topics",
                "type",
                partition(detached),
                false,
            )?,
            None => None,
        };
        Ok(Subtopics {
            doc,
            container,
            name: doc.resolver().qualify(doc.content(), "topic"),
            position: 0,
        })
    }

    /// Marker ids in insertion order, duplicates included.
    pub fn markers(&self) -> Result<Vec<&'a str>> {
        let doc = self.doc;
        let Some(refs) = doc.find_path(self.node, &["marker-refs"])? else {
            return Ok(Vec::new());
        };
        Ok(doc
            .resolver()
            .find_children(doc.content(), refs, "marker-ref")
            .into_iter()
            .filter_map(|node| doc.content().attribute(node, "marker-id"))
            .collect())
    }

    /// Link or attachment reference (`xlink:href`).
    pub fn link(&self) -> Option<&'a str> {
        self.doc.content().attribute(self.node, ATTR_HREF)
    }

    /// Name of the attachment the reference points at, if it is one.
    pub fn attachment_name(&self) -> Option<&'a str> {
        self.link()?
            .strip_prefix(ATTACHMENT_REF_PREFIX)?
            .strip_prefix(ATTACHMENTS_DIR)
    }

    /// Plain-text note.
    pub fn note(&self) -> Result<Option<Cow<'a, str>>> {
        self.text_at(&["notes", "plain"])
    }

    /// Label text.
    pub fn label(&self) -> Result<Option<Cow<'a, str>>> {
        self.text_at(&["labels", "label"])
    }

    /// Id of the assigned style.
    pub fn style_id(&self) -> Option<&'a str> {
        self.doc.content().attribute(self.node, ATTR_STYLE_ID)
    }

    fn text_at(&self, path: &[&str]) -> Result<Option<Cow<'a, str>>> {
        let doc = self.doc;
        Ok(doc
            .find_path(self.node, path)?
            .map(|node| doc.content().text(node)))
    }
}

/// Iterator over the children of one partition.
///
/// Clone it before iterating to walk the same children again.
#[derive(Debug, Clone)]
pub struct Subtopics<'a> {
    doc: &'a Document,
    container: Option<NodeId>,
    name: QualifiedName,
    position: usize,
}

impl<'a> Iterator for Subtopics<'a> {
    type Item = Topic<'a>;

    fn next(&mut self) -> Option<Topic<'a>> {
        let doc = self.doc;
        let tree = doc.content();
        let children = tree.children(self.container?);
        while let Some(&child) = children.get(self.position) {
            self.position += 1;
            if tree.name(child).is_some_and(|name| name.matches(&self.name)) {
                return Some(Topic::new(doc, child));
            }
        }
        None
    }
}

/// Mutable access to a topic.
#[derive(Debug)]
pub struct TopicMut<'a> {
    doc: &'a mut Document,
    node: NodeId,
}

impl<'a> TopicMut<'a> {
    pub(crate) fn new(doc: &'a mut Document, node: NodeId) -> Self {
        Self { doc, node }
    }

    pub fn key(&self) -> TopicKey {
        TopicKey(self.node)
    }

    /// Read-only view of this topic.
    pub fn as_topic(&self) -> Topic<'_> {
        Topic::new(self.doc, self.node)
    }

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        self.set_text_at(&["title"], title)
    }

    /// Add a child topic to the attached or detached partition.
    ///
    /// The child id embeds `external_id` when given, see
    /// [`IdGenerator::next_id`](crate::common::IdGenerator::next_id).
    pub fn add_subtopic(
        &mut self,
        title: &str,
        external_id: Option<&str>,
        detached: bool,
    ) -> Result<TopicMut<'_>> {
        let id = self.doc.next_id(external_id)?;
        let container = self.partition_container(detached)?;

        let topic = self.doc.create_child(container, "topic");
        self.doc.content_mut().set_attribute(topic, "id", &id);
        let title_node = self.doc.create_child(topic, "title");
        self.doc.content_mut().set_text(title_node, title);

        Ok(TopicMut::new(self.doc, topic))
    }

    fn partition_container(&mut self, detached: bool) -> Result<NodeId> {
        let children = self.doc.ensure_path(self.node, &["children"])?;
        let kind = partition(detached);
        let existing = self.doc.resolver().find_only_child_where(
            self.doc.content(),
            children,
            "topics",
            "type",
            kind,
            false,
        )?;
        Ok(match existing {
            Some(container) => container,
            None => {
                let container = self.doc.create_child(children, "topics");
                self.doc.content_mut().set_attribute(container, "type", kind);
                container
            },
        })
    }

    /// Append a marker reference.
    pub fn add_marker(&mut self, marker_id: &str) -> Result<()> {
        if !is_builtin_marker(marker_id) {
            tracing::debug!(marker_id, "referencing custom marker");
        }
        let refs = self.doc.ensure_path(self.node, &["marker-refs"])?;
        let marker = self.doc.create_child(refs, "marker-ref");
        self.doc.content_mut().set_attribute(marker, "marker-id", marker_id);
        Ok(())
    }

    /// Point the topic at a URL, replacing any link or attachment reference.
    pub fn set_link(&mut self, url: &str) {
        self.doc.content_mut().set_attribute(self.node, ATTR_HREF, url);
    }

    /// Store `data` as a package attachment and point the topic at it.
    ///
    /// The attachment is named after a fresh id plus `extension` (with or
    /// without the leading dot). Replaces any link set earlier. Returns the
    /// attachment name.
    pub fn set_attachment(&mut self, data: impl Into<Bytes>, extension: &str) -> Result<String> {
        let mut name = self.doc.next_id(None)?;
        if !extension.is_empty() && !extension.starts_with('.') {
            name.push('.');
        }
        name.push_str(extension);

        let reference = format!("{}{}{}", ATTACHMENT_REF_PREFIX, ATTACHMENTS_DIR, name);
        self.doc.insert_attachment(name.clone(), data.into())?;
        self.set_link(&reference);
        Ok(name)
    }

    /// Set the note text.
    ///
    /// The text is stored verbatim as the plain note; the rich (XHTML) note is
    /// rebuilt with one paragraph per line.
    pub fn set_note(&mut self, text: &str) -> Result<()> {
        self.set_text_at(&["notes", "plain"], text)?;

        let html = self.doc.ensure_path(self.node, &["notes", "html"])?;
        self.doc.content_mut().clear_children(html);
        for line in text.split('\n') {
            let paragraph = self.doc.create_child(html, "xhtml:p");
            let line = line.strip_suffix('\r').unwrap_or(line);
            self.doc.content_mut().set_text(paragraph, line);
        }
        Ok(())
    }

    pub fn set_label(&mut self, text: &str) -> Result<()> {
        self.set_text_at(&["labels", "label"], text)
    }

    /// Reference a style. The id is not checked against the style tree.
    pub fn set_style(&mut self, style: &StyleId) {
        self.doc
            .content_mut()
            .set_attribute(self.node, ATTR_STYLE_ID, style.as_str());
    }

    fn set_text_at(&mut self, path: &[&str], text: &str) -> Result<()> {
        let node = self.doc.ensure_path(self.node, path)?;
        self.doc.content_mut().set_text(node, text);
        Ok(())
    }
}
