//! Sheet legend: the list of marker meanings shown next to a diagram.

use crate::common::Result;
use crate::xmind::document::Document;
use crate::xmind::elements::NodeId;

/// One legend entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerDescription<'a> {
    /// Built-in marker id (`priority-1`, ...) or the hash of a custom marker
    pub marker_id: &'a str,
    pub description: &'a str,
}

/// Read-only view of a legend.
#[derive(Debug, Clone, Copy)]
pub struct Legend<'a> {
    doc: &'a Document,
    node: NodeId,
}

impl<'a> Legend<'a> {
    pub(crate) fn new(doc: &'a Document, node: NodeId) -> Self {
        Self { doc, node }
    }

    /// Whether editors show the legend.
    pub fn is_visible(&self) -> bool {
        self.doc.content().attribute(self.node, "visibility") == Some("visible")
    }

    /// Entries in insertion order.
    pub fn markers(&self) -> Result<Vec<MarkerDescription<'a>>> {
        let doc = self.doc;
        let Some(list) = doc.find_path(self.node, &["marker-descriptions"])? else {
            return Ok(Vec::new());
        };
        let tree = doc.content();
        Ok(doc
            .resolver()
            .find_children(tree, list, "marker-description")
            .into_iter()
            .map(|node| MarkerDescription {
                marker_id: tree.attribute(node, "marker-id").unwrap_or_default(),
                description: tree.attribute(node, "description").unwrap_or_default(),
            })
            .collect())
    }

    /// Position relative to the map centre, `None` when unset or not numeric.
    pub fn position(&self) -> Result<Option<(i64, i64)>> {
        let doc = self.doc;
        let Some(position) = doc.find_path(self.node, &["position"])? else {
            return Ok(None);
        };
        let tree = doc.content();
        let coordinate = |key: &str| tree.attribute(position, key)?.trim().parse::<i64>().ok();
        Ok(coordinate("svg:x").zip(coordinate("svg:y")))
    }
}

/// Mutable access to a legend.
#[derive(Debug)]
pub struct LegendMut<'a> {
    doc: &'a mut Document,
    node: NodeId,
}

impl<'a> LegendMut<'a> {
    pub(crate) fn new(doc: &'a mut Document, node: NodeId) -> Self {
        Self { doc, node }
    }

    pub fn as_legend(&self) -> Legend<'_> {
        Legend::new(self.doc, self.node)
    }

    /// Append an entry describing `marker_id`.
    pub fn add_marker(&mut self, marker_id: &str, description: &str) -> Result<()> {
        let list = self.doc.ensure_path(self.node, &["marker-descriptions"])?;
        let entry = self.doc.create_child(list, "marker-description");
        let tree = self.doc.content_mut();
        tree.set_attribute(entry, "marker-id", marker_id);
        tree.set_attribute(entry, "description", description);
        Ok(())
    }

    /// Place the legend relative to the map centre (negative is up and left).
    pub fn set_position(&mut self, x: i64, y: i64) -> Result<()> {
        let position = self.doc.ensure_path(self.node, &["position"])?;
        let tree = self.doc.content_mut();
        let mut buffer = itoa::Buffer::new();
        tree.set_attribute(position, "svg:x", buffer.format(x));
        tree.set_attribute(position, "svg:y", buffer.format(y));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legend_entries_and_position() {
        let mut doc = Document::create("S1", "Root").unwrap();
        {
            let mut sheet = doc.first_sheet_mut().unwrap();
            let mut legend = sheet.get_or_create_legend().unwrap();
            assert!(legend.as_legend().markers().unwrap().is_empty());
            assert_eq!(legend.as_legend().position().unwrap(), None);

            legend.add_marker("flag-red", "Blocked").unwrap();
            legend.add_marker("task-done", "Finished").unwrap();
            legend.set_position(-120, 40).unwrap();
            legend.set_position(-100, 30).unwrap();
        }

        let legend = doc.first_sheet().unwrap().legend().unwrap().unwrap();
        assert!(legend.is_visible());
        assert_eq!(
            legend.markers().unwrap(),
            [
                MarkerDescription { marker_id: "flag-red", description: "Blocked" },
                MarkerDescription { marker_id: "task-done", description: "Finished" },
            ]
        );
        assert_eq!(legend.position().unwrap(), Some((-100, 30)));

        let xml = doc.content_xml();
        assert!(xml.contains(r#"<position svg:x="-100" svg:y="30"/>"#));
        assert_eq!(xml.matches("<marker-descriptions>").count(), 1);
    }
}
