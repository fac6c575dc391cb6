//! XML text helpers shared by the element tree and the package writer.

mod escape;

pub use escape::{escape_text, escape_xml, resolve_entity, unescape_xml};
