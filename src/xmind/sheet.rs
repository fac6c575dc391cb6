//! Sheet views.

use crate::common::Result;
use crate::xmind::document::Document;
use crate::xmind::elements::NodeId;
use crate::xmind::legend::{Legend, LegendMut};
use crate::xmind::topic::{Topic, TopicMut};
use std::borrow::Cow;

/// One diagram page: a title, a root topic and an optional legend.
#[derive(Debug, Clone, Copy)]
pub struct Sheet<'a> {
    doc: &'a Document,
    node: NodeId,
}

impl<'a> Sheet<'a> {
    pub(crate) fn new(doc: &'a Document, node: NodeId) -> Self {
        Self { doc, node }
    }

    /// Element id of the sheet.
    pub fn id(&self) -> &'a str {
        self.doc.content().attribute(self.node, "id").unwrap_or_default()
    }

    /// Sheet title, empty when the sheet has none.
    pub fn title(&self) -> Result<Cow<'a, str>> {
        let doc = self.doc;
        Ok(match doc.find_path(self.node, &["title"])? {
            Some(title) => doc.content().text(title),
            None => Cow::Borrowed(""),
        })
    }

    /// The root topic.
    ///
    /// # Errors
    ///
    /// A structural error when the sheet has no topic or more than one.
    pub fn root_topic(&self) -> Result<Topic<'a>> {
        let node = root_topic_node(self.doc, self.node)?;
        Ok(Topic::new(self.doc, node))
    }

    /// The legend, if the sheet has one.
    pub fn legend(&self) -> Result<Option<Legend<'a>>> {
        let doc = self.doc;
        Ok(doc
            .find_path(self.node, &["legend"])?
            .map(|node| Legend::new(doc, node)))
    }
}

/// Mutable access to a sheet.
#[derive(Debug)]
pub struct SheetMut<'a> {
    doc: &'a mut Document,
    node: NodeId,
}

impl<'a> SheetMut<'a> {
    pub(crate) fn new(doc: &'a mut Document, node: NodeId) -> Self {
        Self { doc, node }
    }

    /// Read-only view of this sheet.
    pub fn as_sheet(&self) -> Sheet<'_> {
        Sheet::new(self.doc, self.node)
    }

    /// Replace the sheet title.
    pub fn set_title(&mut self, title: &str) -> Result<()> {
        let node = self.doc.ensure_path(self.node, &["title"])?;
        self.doc.content_mut().set_text(node, title);
        Ok(())
    }

    /// The root topic, for modification.
    pub fn root_topic_mut(&mut self) -> Result<TopicMut<'_>> {
        let node = root_topic_node(self.doc, self.node)?;
        Ok(TopicMut::new(self.doc, node))
    }

    /// Turn this handle into a handle on the root topic.
    pub fn into_root_topic(self) -> Result<TopicMut<'a>> {
        let node = root_topic_node(self.doc, self.node)?;
        Ok(TopicMut::new(self.doc, node))
    }

    /// The legend, created empty (and visible) when the sheet has none yet.
    pub fn get_or_create_legend(&mut self) -> Result<LegendMut<'_>> {
        let node = match self.doc.find_path(self.node, &["legend"])? {
            Some(node) => node,
            None => {
                let node = self.doc.create_child(self.node, "legend");
                self.doc.content_mut().set_attribute(node, "visibility", "visible");
                node
            },
        };
        Ok(LegendMut::new(self.doc, node))
    }
}

fn root_topic_node(doc: &Document, sheet: NodeId) -> Result<NodeId> {
    doc.resolver().require_child(doc.content(), sheet, "topic")
}

#[cfg(test)]
mod tests {
    use crate::xmind::Document;

    #[test]
    fn test_set_title() {
        let mut doc = Document::create("S1", "Root").unwrap();
        doc.first_sheet_mut().unwrap().set_title("Renamed").unwrap();
        assert_eq!(doc.first_sheet().unwrap().title().unwrap(), "Renamed");
        // The title element is reused, not duplicated
        assert_eq!(doc.content_xml().matches("<title>Renamed</title>").count(), 1);
    }

    #[test]
    fn test_legend_read_path_does_not_create() {
        let mut doc = Document::create("S1", "Root").unwrap();
        assert!(doc.first_sheet().unwrap().legend().unwrap().is_none());
        assert!(!doc.content_xml().contains("<legend"));

        {
            let mut sheet = doc.first_sheet_mut().unwrap();
            sheet.get_or_create_legend().unwrap();
            sheet.get_or_create_legend().unwrap();
        }
        assert_eq!(doc.content_xml().matches("<legend").count(), 1);
        assert!(doc.content_xml().contains(r#"<legend visibility="visible"/>"#));
        assert!(doc.first_sheet().unwrap().legend().unwrap().is_some());
    }

    #[test]
    fn test_into_root_topic() {
        let mut doc = Document::create("S1", "Root").unwrap();
        let root = doc.first_sheet_mut().unwrap().into_root_topic().unwrap();
        assert_eq!(root.as_topic().title().unwrap(), "Root");
    }
}
