//! Unified error types for the loquat library.
//!
//! Structural errors raised while navigating a document tree, archive errors
//! raised while reading or writing a package, and identifier overflow all
//! surface through the single [`Error`] type.

// Submodule declarations
pub mod types;
pub mod conversions;

// Re-exports
pub use types::{Error, Result};
