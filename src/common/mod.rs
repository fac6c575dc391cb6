//! Common types and utilities shared across the crate.
//!
//! This module provides the unified error type, identifier generation, and
//! the XML escaping helpers used by both the tree serializer and the package
//! writer.

// Submodule declarations
pub mod error;
pub mod id;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
pub use id::{IdGenerator, qualify_id, unique_id};
