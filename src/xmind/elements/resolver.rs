//! Tag resolution for building and navigating XMind trees.
//!
//! A tree built in memory and a tree parsed from disk spell the same element
//! differently: freshly created elements carry bare names, while parsed
//! elements are fully qualified by the document's default namespace. A
//! [`TagResolver`] hides that difference behind one lookup/creation API.
//!
//! A document picks one resolver when it is created or opened and keeps it:
//!
//! - [`Constructing`] for documents built with `Document::create`
//! - [`Navigating`] for documents read with `Document::open`
//!
//! Mixing the two on one tree would make lookups miss elements created by the
//! other regime.

use crate::common::{Error, Result};
use crate::xmind::elements::element::{NodeId, XmlTree};
use crate::xmind::elements::namespace::QualifiedName;

/// Namespace-aware navigation and creation of child elements.
///
/// Implementors only decide how a short tag name (`topic`, `xhtml:p`) becomes
/// a [`QualifiedName`]; lookups and creation are shared.
pub trait TagResolver: std::fmt::Debug + Send + Sync {
    /// Resolve a short tag name for `tree`.
    fn qualify(&self, tree: &XmlTree, name: &str) -> QualifiedName;

    /// Append a new child element named `name` under `parent`.
    fn create_child(&self, tree: &mut XmlTree, parent: NodeId, name: &str) -> NodeId {
        let qualified = self.qualify(tree, name);
        tree.append_element(parent, qualified)
    }

    /// All children of `parent` named `name`, in document order.
    fn find_children(&self, tree: &XmlTree, parent: NodeId, name: &str) -> Vec<NodeId> {
        let wanted = self.qualify(tree, name);
        tree.element_children(parent)
            .filter(|child| tree.name(*child).is_some_and(|n| n.matches(&wanted)))
            .collect()
    }

    /// The single child of `parent` named `name`.
    ///
    /// Returns `Ok(None)` when the child is absent and `required` is false.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingElement`] when absent and `required` is true
    /// - [`Error::AmbiguousElement`] when more than one child matches
    fn find_only_child(
        &self,
        tree: &XmlTree,
        parent: NodeId,
        name: &str,
        required: bool,
    ) -> Result<Option<NodeId>> {
        let matches = self.find_children(tree, parent, name);
        only_match(tree, parent, name, matches, required)
    }

    /// The single child of `parent` named `name`, which must exist.
    fn require_child(&self, tree: &XmlTree, parent: NodeId, name: &str) -> Result<NodeId> {
        let matches = self.find_children(tree, parent, name);
        exactly_one(tree, parent, name, &matches)
    }

    /// Like [`find_only_child`](Self::find_only_child), restricted to children
    /// whose attribute `key` equals `value`.
    fn find_only_child_where(
        &self,
        tree: &XmlTree,
        parent: NodeId,
        name: &str,
        key: &str,
        value: &str,
        required: bool,
    ) -> Result<Option<NodeId>> {
        let matches: Vec<NodeId> = self
            .find_children(tree, parent, name)
            .into_iter()
            .filter(|child| tree.attribute(*child, key) == Some(value))
            .collect();
        only_match(tree, parent, name, matches, required)
    }

    /// The single child named `name`, created when absent. Idempotent.
    fn find_or_create_child(&self, tree: &mut XmlTree, parent: NodeId, name: &str) -> Result<NodeId> {
        match self.find_only_child(tree, parent, name, false)? {
            Some(child) => Ok(child),
            None => Ok(self.create_child(tree, parent, name)),
        }
    }
}

fn only_match(
    tree: &XmlTree,
    parent: NodeId,
    name: &str,
    matches: Vec<NodeId>,
    required: bool,
) -> Result<Option<NodeId>> {
    if matches.is_empty() && !required {
        return Ok(None);
    }
    exactly_one(tree, parent, name, &matches).map(Some)
}

fn exactly_one(tree: &XmlTree, parent: NodeId, name: &str, matches: &[NodeId]) -> Result<NodeId> {
    match matches {
        [] => Err(Error::MissingElement {
            tag: name.to_string(),
            parent: tree.describe(parent),
            known: tree
                .element_children(parent)
                .map(|child| tree.describe(child))
                .collect::<Vec<_>>()
                .join(", "),
        }),
        [only] => Ok(*only),
        _ => Err(Error::AmbiguousElement {
            tag: name.to_string(),
            parent: tree.describe(parent),
            count: matches.len(),
        }),
    }
}

/// Resolver for trees built in memory: bare names are used as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Constructing;

impl TagResolver for Constructing {
    fn qualify(&self, _tree: &XmlTree, name: &str) -> QualifiedName {
        QualifiedName::from_string(name)
    }
}

/// Resolver for parsed trees: bare names receive the tree's default namespace.
///
/// A tree without a default declaration (a prefixed root such as
/// `<xm:xmap-content>`) uses the namespace of its root element instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct Navigating;

impl TagResolver for Navigating {
    fn qualify(&self, tree: &XmlTree, name: &str) -> QualifiedName {
        let qualified = QualifiedName::from_string(name);
        if qualified.namespace_uri.is_some() || name.contains(':') {
            return qualified;
        }
        let namespace = match tree.default_namespace() {
            "" => tree
                .name(tree.root())
                .and_then(|root| root.namespace_uri.as_deref()),
            default => Some(default),
        };
        match namespace {
            Some(namespace) => QualifiedName::new(Some(namespace), name),
            None => qualified,
        }
    }
}

/// Shared instance of the constructing regime.
pub static CONSTRUCTING: Constructing = Constructing;
/// Shared instance of the navigating regime.
pub static NAVIGATING: Navigating = Navigating;
