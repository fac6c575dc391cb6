//! XML building blocks of XMind documents.

/// Arena-backed XML tree
pub mod element;
/// Namespace table and qualified names
pub mod namespace;
/// Constructing/navigating tag resolution
pub mod resolver;

pub use element::{NodeId, XmlTree};
pub use namespace::QualifiedName;
pub use resolver::{CONSTRUCTING, Constructing, NAVIGATING, Navigating, TagResolver};
