//! XMind mind-map documents (.xmind).
//!
//! A document is a ZIP package holding `content.xml` (sheets and topics),
//! `styles.xml` (topic styles), a fixed `meta.xml`, attachments and an
//! optional marker package:
//!
//! - [`Document`] owns the parsed trees and the attachment table
//! - [`Sheet`], [`Topic`], [`Legend`] and [`TopicStyle`] are read-only views
//! - [`SheetMut`], [`TopicMut`] and [`LegendMut`] modify the document
//!
//! # Example
//!
//! ```no_run
//! use loquat::xmind::{Document, StyleSpec};
//!
//! # fn main() -> loquat::Result<()> {
//! let mut doc = Document::create("Roadmap", "Product")?;
//! let style = doc.create_topic_style(&StyleSpec::new("#37D02B"))?;
//! {
//!     let mut root = doc.first_sheet_mut()?.into_root_topic()?;
//!     let mut design = root.add_subtopic("Design", Some("TASK-1"), false)?;
//!     design.add_marker("priority-1")?;
//!     design.set_note("Wireframes\nReview")?;
//!     design.set_style(&style);
//! }
//! doc.save("roadmap.xmind")?;
//!
//! let reopened = Document::open("roadmap.xmind")?;
//! let root = reopened.first_sheet()?.root_topic()?;
//! for topic in root.subtopics(false)? {
//!     println!("{} ({:?})", topic.title()?, topic.embedded_id());
//! }
//! # Ok(())
//! # }
//! ```

/// Package paths, marker ids and shape classes
pub mod constants;
/// ZIP package reading and writing
pub mod core;
/// XML tree, namespaces and tag resolution
pub mod elements;

mod document;
mod legend;
mod sheet;
mod style;
mod topic;

pub use document::{Document, DocumentOptions};
pub use legend::{Legend, LegendMut, MarkerDescription};
pub use sheet::{Sheet, SheetMut};
pub use style::{StyleId, StyleSpec, TopicStyle};
pub use topic::{Subtopics, Topic, TopicKey, TopicMut};
