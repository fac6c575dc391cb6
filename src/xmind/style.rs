//! Topic styles stored in `styles.xml`.

use crate::common::Result;
use crate::xmind::constants::{DEFAULT_LINE_COLOR, DEFAULT_LINE_WIDTH, SHAPE_ROUND_RECTANGLE};
use crate::xmind::document::Document;
use crate::xmind::elements::NodeId;

/// Visual properties of a new topic style.
///
/// # Examples
///
/// ```
/// use loquat::xmind::{Document, StyleSpec, constants::SHAPE_ELLIPSE};
///
/// # fn main() -> loquat::Result<()> {
/// let mut doc = Document::create("Sheet", "Root")?;
/// let style = doc.create_topic_style(&StyleSpec::new("#37D02B").with_shape(SHAPE_ELLIPSE))?;
/// doc.first_sheet_mut()?.root_topic_mut()?.set_style(&style);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSpec {
    /// Fill colour, e.g. `#37D02B`
    pub fill: String,
    /// Topic shape class
    pub shape: String,
    /// Border colour
    pub line_color: String,
    /// Border width, e.g. `1pt`
    pub line_width: String,
}

impl StyleSpec {
    /// A rounded rectangle with a thin grey border and the given fill.
    pub fn new(fill: impl Into<String>) -> Self {
        Self {
            fill: fill.into(),
            shape: SHAPE_ROUND_RECTANGLE.to_string(),
            line_color: DEFAULT_LINE_COLOR.to_string(),
            line_width: DEFAULT_LINE_WIDTH.to_string(),
        }
    }

    pub fn with_shape(mut self, shape: impl Into<String>) -> Self {
        self.shape = shape.into();
        self
    }

    pub fn with_line_color(mut self, color: impl Into<String>) -> Self {
        self.line_color = color.into();
        self
    }

    pub fn with_line_width(mut self, width: impl Into<String>) -> Self {
        self.line_width = width.into();
        self
    }
}

/// Id of a style record, as returned by
/// [`Document::create_topic_style`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleId(String);

impl StyleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StyleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only view of a style record.
#[derive(Debug, Clone, Copy)]
pub struct TopicStyle<'a> {
    doc: &'a Document,
    node: NodeId,
}

impl<'a> TopicStyle<'a> {
    pub(crate) fn new(doc: &'a Document, node: NodeId) -> Self {
        Self { doc, node }
    }

    pub fn id(&self) -> &'a str {
        self.doc.styles().attribute(self.node, "id").unwrap_or_default()
    }

    pub fn fill(&self) -> Result<Option<&'a str>> {
        self.property("svg:fill")
    }

    pub fn shape(&self) -> Result<Option<&'a str>> {
        self.property("shape-class")
    }

    pub fn line_color(&self) -> Result<Option<&'a str>> {
        self.property("line-color")
    }

    pub fn line_width(&self) -> Result<Option<&'a str>> {
        self.property("line-width")
    }

    fn property(&self, key: &str) -> Result<Option<&'a str>> {
        let doc = self.doc;
        let tree = doc.styles();
        let properties = doc
            .resolver()
            .find_only_child(tree, self.node, "topic-properties", false)?;
        Ok(properties.and_then(|node| tree.attribute(node, key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xmind::constants::SHAPE_RECTANGLE;

    #[test]
    fn test_style_defaults() {
        let mut doc = Document::create("S1", "Root").unwrap();
        let id = doc.create_topic_style(&StyleSpec::new("#FF0000")).unwrap();
        let style = doc.topic_style(id.as_str()).unwrap().unwrap();
        assert_eq!(style.fill().unwrap(), Some("#FF0000"));
        assert_eq!(style.shape().unwrap(), Some(SHAPE_ROUND_RECTANGLE));
        assert_eq!(style.line_color().unwrap(), Some("#CACACA"));
        assert_eq!(style.line_width().unwrap(), Some("1pt"));
    }

    #[test]
    fn test_style_overrides_and_assignment() {
        let mut doc = Document::create("S1", "Root").unwrap();
        let spec = StyleSpec::new("#00FF00")
            .with_shape(SHAPE_RECTANGLE)
            .with_line_color("#000000")
            .with_line_width("3pt");
        let first = doc.create_topic_style(&spec).unwrap();
        let second = doc.create_topic_style(&spec).unwrap();
        assert_ne!(first, second);
        // Both records share one `styles` container
        assert_eq!(doc.styles_xml().matches("<styles>").count(), 1);

        doc.first_sheet_mut()
            .unwrap()
            .into_root_topic()
            .unwrap()
            .set_style(&second);
        let root = doc.first_sheet().unwrap().root_topic().unwrap();
        assert_eq!(root.style_id(), Some(second.as_str()));

        let style = doc.topic_style(root.style_id().unwrap()).unwrap().unwrap();
        assert_eq!(style.shape().unwrap(), Some(SHAPE_RECTANGLE));
        assert_eq!(style.line_width().unwrap(), Some("3pt"));
    }

    #[test]
    fn test_unknown_style_reference_is_stored() {
        let mut doc = Document::create("S1", "Root").unwrap();
        doc.first_sheet_mut()
            .unwrap()
            .into_root_topic()
            .unwrap()
            .set_style(&StyleId::new("nope"));
        let root = doc.first_sheet().unwrap().root_topic().unwrap();
        assert_eq!(root.style_id(), Some("nope"));
        assert!(doc.topic_style("nope").unwrap().is_none());
    }
}
