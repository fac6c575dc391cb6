//! Arena-backed XML element tree.
//!
//! Both `content.xml` and `styles.xml` live in an [`XmlTree`]: a flat vector of
//! nodes addressed by [`NodeId`]. Views such as `Topic` hold a `NodeId` plus a
//! reference to the owning document, so handing out views never clones XML.
//!
//! Text is kept as separate child nodes, which preserves mixed content such as
//! rich XHTML notes in document order.

use crate::common::xml::{escape_text, resolve_entity, unescape_xml};
use crate::common::{Error, Result};
use crate::xmind::elements::namespace::{
    NamespaceContext, QualifiedName, prefix_to_uri, uri_to_prefix,
};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smallvec::SmallVec;
use std::borrow::Cow;

/// XML declaration written at the top of every serialized tree.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#;

/// Index of a node inside an [`XmlTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

type Attributes = SmallVec<[(String, String); 4]>;

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        name: QualifiedName,
        attributes: Attributes,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An XML document held as an arena of nodes.
#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<Node>,
    root: NodeId,
    default_namespace: String,
    namespaces: Vec<(String, String)>,
}

impl XmlTree {
    /// Create a tree holding only a root element.
    ///
    /// `default_namespace` is written as the root's `xmlns` declaration and
    /// `namespaces` as its prefixed declarations.
    pub fn new(root: QualifiedName, default_namespace: &str, namespaces: &[(&str, &str)]) -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Element {
                    name: root,
                    attributes: Attributes::new(),
                },
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
            default_namespace: default_namespace.to_string(),
            namespaces: namespaces
                .iter()
                .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
                .collect(),
        }
    }

    /// The root element
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Namespace unprefixed element names belong to.
    #[inline]
    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    #[inline]
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Whether `id` addresses a node of this tree.
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Name of an element node, `None` for text nodes.
    pub fn name(&self, id: NodeId) -> Option<&QualifiedName> {
        match &self.node(id).data {
            NodeData::Element { name, .. } => Some(name),
            NodeData::Text(_) => None,
        }
    }

    /// Human-readable name used in error messages.
    pub fn describe(&self, id: NodeId) -> String {
        match self.name(id) {
            Some(name) => name.to_string(),
            None => "#text".to_string(),
        }
    }

    /// Parent of a node, `None` for the root and for detached nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// All child nodes, text included, in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Element children in document order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .children
            .iter()
            .copied()
            .filter(move |child| matches!(self.node(*child).data, NodeData::Element { .. }))
    }

    /// Get attribute value by its (standard-prefixed) key.
    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            NodeData::Text(_) => None,
        }
    }

    /// Set attribute value, keeping the position of an existing attribute.
    pub fn set_attribute(&mut self, id: NodeId, key: &str, value: &str) {
        if let NodeData::Element { attributes, .. } = &mut self.node_mut(id).data {
            match attributes.iter_mut().find(|(k, _)| k == key) {
                Some((_, existing)) => {
                    existing.clear();
                    existing.push_str(value);
                },
                None => attributes.push((key.to_string(), value.to_string())),
            }
        }
    }

    /// Concatenated text of the direct text children.
    pub fn text(&self, id: NodeId) -> Cow<'_, str> {
        let mut texts = self.node(id).children.iter().filter_map(|child| {
            match &self.node(*child).data {
                NodeData::Text(text) => Some(text.as_str()),
                NodeData::Element { .. } => None,
            }
        });
        let Some(first) = texts.next() else {
            return Cow::Borrowed("");
        };
        match texts.next() {
            None => Cow::Borrowed(first),
            Some(second) => {
                let mut joined = String::from(first);
                joined.push_str(second);
                texts.for_each(|t| joined.push_str(t));
                Cow::Owned(joined)
            },
        }
    }

    /// Replace the direct text children with `text`, placed before any element child.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        let nodes = &self.nodes;
        let mut kept: Vec<NodeId> = self.node(id)
            .children
            .iter()
            .copied()
            .filter(|child| match &nodes[child.index()].data {
                NodeData::Text(text) => !text.contains('\n'),
                NodeData::Element { .. } => true,
            })
            .collect();
        if !text.is_empty() {
            let text_node = self.push_node(NodeData::Text(text.to_string()), Some(id));
            kept.insert(0, text_node);
        }
        self.node_mut(id).children = kept;
    }

    /// Append a new element as the last child of `parent`.
    pub fn append_element(&mut self, parent: NodeId, name: QualifiedName) -> NodeId {
        let child = self.push_node(
            NodeData::Element {
                name,
                attributes: Attributes::new(),
            },
            Some(parent),
        );
        self.node_mut(parent).children.push(child);
        child
    }

    /// Detach every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.node_mut(id).children);
        for child in children {
            self.node_mut(child).parent = None;
        }
    }

    /// Every element reachable from the root, in document order.
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if self.name(id).is_none() {
                continue;
            }
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    fn push_node(&mut self, data: NodeData, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            data,
            parent,
            children: Vec::new(),
        });
        id
    }

    fn push_text(&mut self, parent: NodeId, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(&last) = self.node(parent).children.last() {
            if let NodeData::Text(existing) = &mut self.node_mut(last).data {
                existing.push_str(text);
                return;
            }
        }
        let node = self.push_node(NodeData::Text(text.to_string()), Some(parent));
        self.node_mut(parent).children.push(node);
    }

    /// Drop indentation-only text between element children.
    ///
    /// Mixed content (any child text that is not pure whitespace) is kept
    /// as is, and so is whitespace without a line break, which separates
    /// inline elements.
    fn strip_formatting_text(&mut self, id: NodeId) {
        let nodes = &self.nodes;
        let children = &nodes[id.index()].children;
        let has_elements = children
            .iter()
            .any(|child| matches!(nodes[child.index()].data, NodeData::Element { .. }));
        let is_mixed = children.iter().any(|child| {
            matches!(&nodes[child.index()].data, NodeData::Text(text) if !text.trim().is_empty())
        });
        if !has_elements || is_mixed {
            return;
        }
        let kept: Vec<NodeId> = children
            .iter()
            .copied()
            .filter(|child| match &nodes[child.index()].data {
                NodeData::Text(text) => !text.contains('\n'),
                NodeData::Element { .. } => true,
            })
            .collect();
        self.node_mut(id).children = kept;
    }

    // ------------------------------------------------------------------------
    // Parsing
    // ------------------------------------------------------------------------

    /// Parse a tree from XML bytes.
    ///
    /// Element names are resolved against their in-scope namespace
    /// declarations; attribute keys are normalized to the standard prefixes.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();
        let mut tree: Option<XmlTree> = None;
        let mut stack: Vec<(NodeId, NamespaceContext)> = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let (id, context) = Self::open_element(&mut tree, &stack, e)?;
                    stack.push((id, context));
                },
                Event::Empty(ref e) => {
                    Self::open_element(&mut tree, &stack, e)?;
                },
                Event::End(_) => {
                    if let (Some((id, _)), Some(tree)) = (stack.pop(), tree.as_mut()) {
                        tree.strip_formatting_text(id);
                    }
                },
                Event::Text(ref t) => {
                    if let (Some((parent, _)), Some(tree)) = (stack.last(), tree.as_mut()) {
                        let raw = std::str::from_utf8(t)?;
                        tree.push_text(*parent, &unescape_xml(raw));
                    }
                },
                Event::CData(ref t) => {
                    if let (Some((parent, _)), Some(tree)) = (stack.last(), tree.as_mut()) {
                        tree.push_text(*parent, std::str::from_utf8(t)?);
                    }
                },
                Event::GeneralRef(ref r) => {
                    if let (Some((parent, _)), Some(tree)) = (stack.last(), tree.as_mut()) {
                        let name = std::str::from_utf8(r)?;
                        let ch = resolve_entity(name).ok_or_else(|| {
                            Error::XmlError(format!("Unknown entity reference &{};", name))
                        })?;
                        let mut encoded = [0u8; 4];
                        tree.push_text(*parent, ch.encode_utf8(&mut encoded));
                    }
                },
                Event::Eof => break,
                _ => {},
            }
            buf.clear();
        }

        tree.ok_or_else(|| Error::XmlError("No root element found".to_string()))
    }

    fn open_element(
        tree: &mut Option<XmlTree>,
        stack: &[(NodeId, NamespaceContext)],
        e: &BytesStart<'_>,
    ) -> Result<(NodeId, NamespaceContext)> {
        let mut context = stack.last().map(|(_, ctx)| ctx.clone()).unwrap_or_default();

        // First pass: collect namespace declarations
        let mut attributes = Attributes::new();
        for attr in e.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref())?;
            let value = unescape_xml(std::str::from_utf8(&attr.value)?);
            if key == "xmlns" || key.starts_with("xmlns:") {
                context.add_namespace(key, &value);
            } else {
                attributes.push((key.to_string(), value));
            }
        }

        // Second pass: normalize attribute prefixes against the final context
        for (key, _) in attributes.iter_mut() {
            *key = context.attribute_key(key);
        }

        let qname = e.name();
        let raw_name = std::str::from_utf8(qname.as_ref())?;
        let name = context.element_name(raw_name);

        let id = if let Some(tree) = tree.as_mut() {
            let (parent, _) = stack
                .last()
                .ok_or_else(|| Error::XmlError("Multiple root elements".to_string()))?;
            let id = tree.append_element(*parent, name);
            tree.record_namespaces(&context);
            id
        } else {
            let default_namespace = context.default_namespace.clone().unwrap_or_default();
            let mut new_tree = XmlTree::new(name, &default_namespace, &[]);
            new_tree.record_namespaces(&context);
            tree.insert(new_tree).root
        };

        if let Some(tree) = tree.as_mut() {
            tree.set_attributes(id, attributes);
        }

        Ok((id, context))
    }

    fn set_attributes(&mut self, id: NodeId, values: Attributes) {
        if let NodeData::Element { attributes, .. } = &mut self.node_mut(id).data {
            *attributes = values;
        }
    }

    /// Remember declarations under their standard prefix, matching how
    /// attribute keys are normalized.
    fn record_namespaces(&mut self, context: &NamespaceContext) {
        let mut declared: Vec<(&String, &String)> = context.prefixes.iter().collect();
        declared.sort();
        for (prefix, uri) in declared {
            if self.namespaces.iter().any(|(_, u)| u == uri) {
                continue;
            }
            let prefix = uri_to_prefix(uri).unwrap_or(prefix);
            if !self.namespaces.iter().any(|(p, _)| p == prefix) {
                self.namespaces.push((prefix.to_string(), uri.clone()));
            }
        }
    }

    // ------------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------------

    /// Serialize the tree, XML declaration included.
    pub fn to_xml_string(&self) -> String {
        let namespaces = self.collect_namespaces();
        let mut xml = String::with_capacity(XML_DECLARATION.len() + self.nodes.len() * 32);
        xml.push_str(XML_DECLARATION);
        self.write_node(&mut xml, self.root, &namespaces, true);
        xml
    }

    /// Declared prefixes plus any namespace used by the tree but never declared.
    fn collect_namespaces(&self) -> Vec<(String, String)> {
        let mut namespaces = self.namespaces.clone();
        let mut declare = |uri: &str| {
            if uri == self.default_namespace || namespaces.iter().any(|(_, u)| u == uri) {
                return;
            }
            let prefix = match uri_to_prefix(uri) {
                Some(prefix) if !namespaces.iter().any(|(p, _)| p == prefix) => prefix.to_string(),
                _ => format!("ns{}", namespaces.len()),
            };
            namespaces.push((prefix, uri.to_string()));
        };

        for id in self.descendants() {
            let NodeData::Element { name, attributes } = &self.node(id).data else {
                continue;
            };
            if let Some(uri) = name.namespace_uri.as_deref() {
                declare(uri);
            }
            for (key, _) in attributes {
                if let Some(uri) = key.split_once(':').and_then(|(prefix, _)| prefix_to_uri(prefix)) {
                    declare(uri);
                }
            }
        }
        namespaces
    }

    fn qualified(&self, name: &QualifiedName, namespaces: &[(String, String)]) -> String {
        match name.namespace_uri.as_deref() {
            None => name.local_name.clone(),
            Some(uri) if uri == self.default_namespace => name.local_name.clone(),
            Some(uri) => match namespaces.iter().find(|(_, u)| u == uri) {
                Some((prefix, _)) => format!("{}:{}", prefix, name.local_name),
                None => name.local_name.clone(),
            },
        }
    }

    fn write_node(&self, output: &mut String, id: NodeId, namespaces: &[(String, String)], is_root: bool) {
        let node = self.node(id);
        let (name, attributes) = match &node.data {
            NodeData::Text(text) => {
                output.push_str(&escape_text(text));
                return;
            },
            NodeData::Element { name, attributes } => (name, attributes),
        };

        let tag = self.qualified(name, namespaces);

        // Opening tag
        output.push('<');
        output.push_str(&tag);

        if is_root {
            if !self.default_namespace.is_empty() {
                push_attribute(output, "xmlns", &self.default_namespace);
            }
            for (prefix, uri) in namespaces {
                output.push_str(" xmlns:");
                output.push_str(prefix);
                output.push_str("=\"");
                push_escaped_attribute(output, uri);
                output.push('"');
            }
        }

        for (key, value) in attributes {
            push_attribute(output, key, value);
        }

        if node.children.is_empty() {
            // Self-closing tag
            output.push_str("/>");
            return;
        }

        output.push('>');
        for child in &node.children {
            self.write_node(output, *child, namespaces, false);
        }

        // Closing tag
        output.push_str("</");
        output.push_str(&tag);
        output.push('>');
    }
}

fn push_attribute(output: &mut String, key: &str, value: &str) {
    output.push(' ');
    output.push_str(key);
    output.push_str("=\"");
    push_escaped_attribute(output, value);
    output.push('"');
}

fn push_escaped_attribute(output: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '"' => output.push_str("&quot;"),
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\n' => output.push_str("&#10;"),
            '\r' => output.push_str("&#13;"),
            '\t' => output.push_str("&#9;"),
            _ => output.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xmind::elements::namespace::{CONTENT_NAMESPACES, CONTENT_NS, XHTML_NS, XLINK_NS};

    fn content_tree() -> XmlTree {
        XmlTree::new(QualifiedName::new(None, "xmap-content"), CONTENT_NS, CONTENT_NAMESPACES)
    }

    #[test]
    fn test_build_and_serialize() {
        let mut tree = content_tree();
        let root = tree.root();
        tree.set_attribute(root, "version", "2.0");
        let sheet = tree.append_element(root, QualifiedName::from_string("sheet"));
        tree.set_attribute(sheet, "id", "s1");
        let title = tree.append_element(sheet, QualifiedName::from_string("title"));
        tree.set_text(title, "A & B");

        let xml = tree.to_xml_string();
        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains(r#"<xmap-content xmlns="urn:xmind:xmap:xmlns:content:2.0""#));
        assert!(xml.contains(r#"xmlns:xlink="http://www.w3.org/1999/xlink""#));
        assert!(xml.contains(r#"<sheet id="s1"><title>A &amp; B</title></sheet>"#));
    }

    #[test]
    fn test_parse_resolves_namespaces() {
        let xml = r#"<?xml version="1.0"?>
<xmap-content xmlns="urn:xmind:xmap:xmlns:content:2.0" xmlns:l="http://www.w3.org/1999/xlink" version="2.0">
  <sheet id="s1">
    <topic id="t1" l:href="http://example.com">
      <title>Root &amp; co</title>
    </topic>
  </sheet>
</xmap-content>"#;
        let tree = XmlTree::parse(xml.as_bytes()).unwrap();
        let root = tree.root();
        assert_eq!(tree.default_namespace(), CONTENT_NS);

        let sheet = tree.element_children(root).next().unwrap();
        let name = tree.name(sheet).unwrap();
        assert_eq!(name.namespace_uri.as_deref(), Some(CONTENT_NS));
        assert_eq!(name.local_name, "sheet");

        let topic = tree.element_children(sheet).next().unwrap();
        assert_eq!(tree.attribute(topic, "xlink:href"), Some("http://example.com"));

        let title = tree.element_children(topic).next().unwrap();
        assert_eq!(tree.text(title), "Root & co");
        // Indentation between elements is dropped
        assert_eq!(tree.children(topic).len(), 1);
    }

    #[test]
    fn test_mixed_content_round_trip() {
        let xml = r#"<html xmlns="http://www.w3.org/1999/xhtml"><p>one <b>two</b> three</p></html>"#;
        let tree = XmlTree::parse(xml.as_bytes()).unwrap();
        let p = tree.element_children(tree.root()).next().unwrap();
        assert_eq!(tree.name(p).unwrap().namespace_uri.as_deref(), Some(XHTML_NS));
        assert_eq!(tree.text(p), "one  three");

        let out = tree.to_xml_string();
        assert!(out.contains("<p>one <b>two</b> three</p>"));
    }

    #[test]
    fn test_space_between_inline_elements_is_kept() {
        let xml = r#"<html xmlns="http://www.w3.org/1999/xhtml">
  <p><b>a</b> <i>b</i></p>
</html>"#;
        let tree = XmlTree::parse(xml.as_bytes()).unwrap();
        assert_eq!(tree.children(tree.root()).len(), 1);
        let p = tree.element_children(tree.root()).next().unwrap();
        assert_eq!(tree.children(p).len(), 3);

        let out = tree.to_xml_string();
        assert!(out.contains("<p><b>a</b> <i>b</i></p>"));
    }

    #[test]
    fn test_attribute_newlines_survive() {
        let mut tree = content_tree();
        let root = tree.root();
        tree.set_attribute(root, "note", "a\nb");
        let reparsed = XmlTree::parse(tree.to_xml_string().as_bytes()).unwrap();
        assert_eq!(reparsed.attribute(reparsed.root(), "note"), Some("a\nb"));
    }

    #[test]
    fn test_undeclared_namespace_is_declared_on_write() {
        let mut tree = XmlTree::new(QualifiedName::new(None, "root"), CONTENT_NS, &[]);
        let root = tree.root();
        tree.append_element(root, QualifiedName::new(Some(XLINK_NS), "extra"));
        let xml = tree.to_xml_string();
        assert!(xml.contains(r#"xmlns:xlink="http://www.w3.org/1999/xlink""#));
        assert!(xml.contains("<xlink:extra/>"));
    }

    #[test]
    fn test_set_text_replaces_previous_text() {
        let mut tree = content_tree();
        let root = tree.root();
        tree.set_text(root, "first");
        tree.set_text(root, "second");
        assert_eq!(tree.text(root), "second");
        tree.set_text(root, "");
        assert_eq!(tree.text(root), "");
    }

    #[test]
    fn test_missing_root_is_an_error() {
        assert!(XmlTree::parse(b"<?xml version=\"1.0\"?>").is_err());
    }
}
