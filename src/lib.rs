//! Loquat - A Rust library for reading and writing XMind mind maps
//!
//! This library builds, opens and saves `.xmind` documents: sheets holding a
//! tree of topics with markers, notes, labels, links, attachments, styles and
//! legends.
//!
//! # Features
//!
//! - **Document model**: Borrowed views over an arena-backed XML tree
//! - **Embedded ids**: External identifiers survive editing in other tools
//! - **Archive codec**: ZIP packages with a generated manifest
//! - **Forward compatible reads**: Unknown package members are skipped
//!
//! # Example - Creating a mind map
//!
//! ```
//! use loquat::xmind::Document;
//!
//! # fn main() -> loquat::Result<()> {
//! let mut doc = Document::create("Sheet 1", "Central topic")?;
//! {
//!     let mut root = doc.first_sheet_mut()?.into_root_topic()?;
//!     root.add_subtopic("Attached", None, false)?;
//!     root.add_subtopic("Floating", None, true)?;
//!     root.add_marker("flag-red")?;
//! }
//!
//! let bytes = doc.to_bytes()?;
//! let reopened = Document::from_bytes(&bytes)?;
//! let root = reopened.first_sheet()?.root_topic()?;
//! assert_eq!(root.markers()?, ["flag-red"]);
//! assert_eq!(root.subtopics(true)?.count(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Reading a mind map
//!
//! ```no_run
//! use loquat::xmind::Document;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = Document::open("map.xmind")?;
//! for sheet in doc.sheets() {
//!     println!("Sheet: {}", sheet.title()?);
//!     let root = sheet.root_topic()?;
//!     for topic in root.subtopics(false)? {
//!         println!("  {} [{}]", topic.title()?, topic.unique_id());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Common types and utilities
pub mod common;

/// XMind document model and package codec
pub mod xmind;

pub use common::{Error, Result};
pub use xmind::{Document, DocumentOptions};
