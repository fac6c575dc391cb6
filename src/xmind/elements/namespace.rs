//! Namespace handling for XMind XML trees.
//!
//! XMind content and style files put their elements into a default namespace
//! and borrow a handful of W3C vocabularies (XLink for topic links, SVG for
//! fills and positions, XHTML for rich notes, XSL-FO for fonts). This module
//! holds the fixed prefix table and the [`QualifiedName`] type every element
//! and lookup is expressed in.

use phf::{Map, phf_map};
use std::collections::HashMap;

// ============================================================================
// NAMESPACE CONSTANTS
// ============================================================================

/// Mind-map content namespace (`content.xml`)
pub const CONTENT_NS: &str = "urn:xmind:xmap:xmlns:content:2.0";

/// Style namespace (`styles.xml`)
pub const STYLE_NS: &str = "urn:xmind:xmap:xmlns:style:2.0";

/// Metadata namespace (`meta.xml`)
pub const META_NS: &str = "urn:xmind:xmap:xmlns:meta:2.0";

/// Manifest namespace (`META-INF/manifest.xml`)
pub const MANIFEST_NS: &str = "urn:xmind:xmap:xmlns:manifest:1.0";

/// XSL-FO namespace
pub const FO_NS: &str = "http://www.w3.org/1999/XSL/Format";

/// SVG namespace
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// XHTML namespace
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// XLink namespace
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

// ============================================================================
// NAMESPACE MAPPING (compile-time perfect hash map)
// ============================================================================

/// Prefix to URI mapping used by lookups (`xm:topic`, `xlink:href`, ...)
static PREFIX_TO_URI: Map<&'static str, &'static str> = phf_map! {
    "xm" => "urn:xmind:xmap:xmlns:content:2.0",
    "st" => "urn:xmind:xmap:xmlns:style:2.0",
    "meta" => "urn:xmind:xmap:xmlns:meta:2.0",
    "manifest" => "urn:xmind:xmap:xmlns:manifest:1.0",
    "fo" => "http://www.w3.org/1999/XSL/Format",
    "svg" => "http://www.w3.org/2000/svg",
    "xhtml" => "http://www.w3.org/1999/xhtml",
    "xlink" => "http://www.w3.org/1999/xlink",
};

/// URI to the prefix written when serializing
static URI_TO_PREFIX: Map<&'static str, &'static str> = phf_map! {
    "urn:xmind:xmap:xmlns:content:2.0" => "xm",
    "urn:xmind:xmap:xmlns:style:2.0" => "st",
    "urn:xmind:xmap:xmlns:meta:2.0" => "meta",
    "urn:xmind:xmap:xmlns:manifest:1.0" => "manifest",
    "http://www.w3.org/1999/XSL/Format" => "fo",
    "http://www.w3.org/2000/svg" => "svg",
    "http://www.w3.org/1999/xhtml" => "xhtml",
    "http://www.w3.org/1999/xlink" => "xlink",
};

/// Namespace declarations of a freshly built `content.xml` root.
pub const CONTENT_NAMESPACES: &[(&str, &str)] = &[
    ("fo", FO_NS),
    ("svg", SVG_NS),
    ("xhtml", XHTML_NS),
    ("xlink", XLINK_NS),
];

/// Namespace declarations of a freshly built `styles.xml` root.
pub const STYLE_NAMESPACES: &[(&str, &str)] = &[("fo", FO_NS), ("svg", SVG_NS)];

/// Resolve a well-known prefix to its namespace URI.
#[inline]
pub fn prefix_to_uri(prefix: &str) -> Option<&'static str> {
    PREFIX_TO_URI.get(prefix).copied()
}

/// Standard prefix for a well-known namespace URI.
#[inline]
pub fn uri_to_prefix(uri: &str) -> Option<&'static str> {
    URI_TO_PREFIX.get(uri).copied()
}

// ============================================================================
// QUALIFIED NAME
// ============================================================================

/// Element or attribute name resolved against a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    /// Namespace URI, `None` for names that were never qualified
    pub namespace_uri: Option<String>,
    /// Local name (without prefix)
    pub local_name: String,
}

impl QualifiedName {
    /// Create a new qualified name
    pub fn new(namespace_uri: Option<&str>, local_name: &str) -> Self {
        Self {
            namespace_uri: namespace_uri.map(str::to_string),
            local_name: local_name.to_string(),
        }
    }

    /// Parse `prefix:local` through the fixed prefix table.
    ///
    /// Unprefixed names get no namespace. Unknown prefixes are kept as part of
    /// the local name so that the name still round-trips verbatim.
    pub fn from_string(name: &str) -> Self {
        match name.split_once(':') {
            Some((prefix, local)) => match prefix_to_uri(prefix) {
                Some(uri) => Self::new(Some(uri), local),
                None => Self::new(None, name),
            },
            None => Self::new(None, name),
        }
    }

    /// Check if this name matches another qualified name
    #[inline]
    pub fn matches(&self, other: &QualifiedName) -> bool {
        self.local_name == other.local_name && self.namespace_uri == other.namespace_uri
    }
}

impl From<&str> for QualifiedName {
    fn from(name: &str) -> Self {
        Self::from_string(name)
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.namespace_uri.as_deref().and_then(uri_to_prefix) {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

// ============================================================================
// NAMESPACE CONTEXT
// ============================================================================

/// In-scope namespace declarations while parsing.
#[derive(Debug, Clone, Default)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI
    pub prefixes: HashMap<String, String>,
    /// Default namespace URI
    pub default_namespace: Option<String>,
}

impl NamespaceContext {
    /// Add a namespace declaration given as the raw attribute key (`xmlns` or `xmlns:p`)
    pub fn add_namespace(&mut self, key: &str, uri: &str) {
        if key == "xmlns" {
            self.default_namespace = Some(uri.to_string());
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            self.prefixes.insert(prefix.to_string(), uri.to_string());
        }
    }

    /// Resolve prefix to namespace URI
    pub fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        match prefix {
            "xml" => Some("http://www.w3.org/XML/1998/namespace"),
            _ => self.prefixes.get(prefix).map(|s| s.as_str()),
        }
    }

    /// Resolve an element name; unprefixed names take the default namespace.
    pub fn element_name(&self, raw: &str) -> QualifiedName {
        match raw.split_once(':') {
            Some((prefix, local)) => match self.resolve_prefix(prefix) {
                Some(uri) => QualifiedName::new(Some(uri), local),
                None => QualifiedName::new(None, raw),
            },
            None => QualifiedName::new(self.default_namespace.as_deref(), raw),
        }
    }

    /// Normalize an attribute key to the standard prefix spelling.
    ///
    /// Unprefixed attributes have no namespace. Prefixed ones are rewritten to
    /// the standard prefix of their namespace, so `l:href` bound to XLink is
    /// stored as `xlink:href`.
    pub fn attribute_key(&self, raw: &str) -> String {
        let Some((prefix, local)) = raw.split_once(':') else {
            return raw.to_string();
        };
        match self.resolve_prefix(prefix).and_then(uri_to_prefix) {
            Some(standard) if standard != prefix => format!("{}:{}", standard, local),
            _ => raw.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_table() {
        assert_eq!(prefix_to_uri("xm"), Some(CONTENT_NS));
        assert_eq!(prefix_to_uri("xlink"), Some(XLINK_NS));
        assert_eq!(uri_to_prefix(SVG_NS), Some("svg"));
        assert_eq!(prefix_to_uri("bogus"), None);
    }

    #[test]
    fn test_qualified_name_from_string() {
        let name = QualifiedName::from_string("xhtml:p");
        assert_eq!(name.namespace_uri.as_deref(), Some(XHTML_NS));
        assert_eq!(name.local_name, "p");

        let bare = QualifiedName::from_string("topic");
        assert_eq!(bare.namespace_uri, None);
        assert_eq!(bare.to_string(), "topic");
    }

    #[test]
    fn test_context_resolution() {
        let mut ctx = NamespaceContext::default();
        ctx.add_namespace("xmlns", CONTENT_NS);
        ctx.add_namespace("xmlns:l", XLINK_NS);

        let topic = ctx.element_name("topic");
        assert!(topic.matches(&QualifiedName::new(Some(CONTENT_NS), "topic")));
        assert_eq!(ctx.attribute_key("l:href"), "xlink:href");
        assert_eq!(ctx.attribute_key("style-id"), "style-id");
    }
}
