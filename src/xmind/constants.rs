//! XMind package constants: member paths, media types, fixed XML payloads,
//! built-in marker ids and topic shape classes.

/// Format version written on every root element
pub const XMAP_VERSION: &str = "2.0";

// ============================================================================
// PACKAGE PATHS
// ============================================================================

/// Structural tree (sheets and topics)
pub const CONTENT_XML: &str = "content.xml";

/// Style tree
pub const STYLES_XML: &str = "styles.xml";

/// Fixed metadata file
pub const META_XML: &str = "meta.xml";

/// Manifest directory
pub const META_INF_DIR: &str = "META-INF/";

/// Manifest listing every package member
pub const MANIFEST_XML: &str = "META-INF/manifest.xml";

/// Directory holding topic attachments
pub const ATTACHMENTS_DIR: &str = "attachments/";

/// Directory holding an embedded marker package
pub const MARKERS_DIR: &str = "markers/";

/// Directory of the preview image written by desktop editors
pub const THUMBNAILS_DIR: &str = "Thumbnails/";

/// Scheme prefix of `xlink:href` values pointing into the package
pub const ATTACHMENT_REF_PREFIX: &str = "xap:";

// ============================================================================
// MEDIA TYPES
// ============================================================================

/// Media type of the XML members
pub const MEDIA_TYPE_XML: &str = "text/xml";

/// Media type left on dynamically added members and directories
pub const MEDIA_TYPE_UNKNOWN: &str = "";

// ============================================================================
// FIXED PAYLOADS
// ============================================================================

/// Contents of `meta.xml`
pub const META_FILE_CONTENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?><meta xmlns="urn:xmind:xmap:xmlns:meta:2.0" version="2.0"/>"#;

/// Style tree used when a package carries no `styles.xml`
pub const DEFAULT_STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?><xmap-styles xmlns="urn:xmind:xmap:xmlns:style:2.0" xmlns:fo="http://www.w3.org/1999/XSL/Format" xmlns:svg="http://www.w3.org/2000/svg" version="2.0"/>"#;

// ============================================================================
// ELEMENT AND ATTRIBUTE NAMES
// ============================================================================

/// `xlink:href` of a topic (link or attachment reference)
pub const ATTR_HREF: &str = "xlink:href";

/// Style reference of a topic
pub const ATTR_STYLE_ID: &str = "style-id";

/// Value of `topics/@type` for attached children
pub const TOPICS_ATTACHED: &str = "attached";

/// Value of `topics/@type` for detached (floating) children
pub const TOPICS_DETACHED: &str = "detached";

// ============================================================================
// MARKERS AND SHAPES
// ============================================================================

/// Marker ids shipped with XMind (see the editor's `markerSheet.xml`)
pub const ALL_MARKERS: &[&str] = &[
    "priority-1", "priority-2", "priority-3", "priority-4", "priority-5", "priority-6",
    "flag-red", "flag-orange", "flag-green", "flag-purple", "flag-blue", "flag-black",
    "smiley-smile", "smiley-laugh", "smiley-angry", "smiley-cry", "smiley-surprise",
    "smiley-boring",
    "other-calendar", "other-email", "other-phone", "other-fax", "other-people",
    "other-clock", "other-coffee-cup", "other-question", "other-exclam", "other-lightbulb",
    "task-start", "task-quarter", "task-half", "task-3quar", "task-done", "task-pause",
];

/// Rectangular topic shape
pub const SHAPE_RECTANGLE: &str = "org.xmind.topicShape.rectangle";

/// Rounded rectangle topic shape (the default)
pub const SHAPE_ROUND_RECTANGLE: &str = "org.xmind.topicShape.roundedRect";

/// Elliptic topic shape
pub const SHAPE_ELLIPSE: &str = "org.xmind.topicShape.ellipse";

/// Default border colour of created styles
pub const DEFAULT_LINE_COLOR: &str = "#CACACA";

/// Default border width of created styles
pub const DEFAULT_LINE_WIDTH: &str = "1pt";

/// Whether `marker_id` names one of the built-in markers.
pub fn is_builtin_marker(marker_id: &str) -> bool {
    ALL_MARKERS.contains(&marker_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_markers() {
        assert!(is_builtin_marker("flag-red"));
        assert!(is_builtin_marker("task-done"));
        assert!(!is_builtin_marker("custom-hash"));
        assert_eq!(ALL_MARKERS.len(), 34);
    }
}
