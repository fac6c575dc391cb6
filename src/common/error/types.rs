//! Unified error type for loquat operations.
use thiserror::Error;

/// Main error type for loquat operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error
    #[error("XML error: {0}")]
    XmlError(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// The archive is not a usable mind-map package (for example, `content.xml` is missing)
    #[error("Invalid XMind file: {0}")]
    InvalidFile(String),

    /// A required element was not found under its parent
    #[error("Tag <{tag}> not found under <{parent}> (known children: {known})")]
    MissingElement {
        tag: String,
        parent: String,
        known: String,
    },

    /// More than one element matched where exactly one was expected
    #[error("Non-unique child <{tag}> under <{parent}>: {count} matches")]
    AmbiguousElement {
        tag: String,
        parent: String,
        count: usize,
    },

    /// The plain identifier counter no longer fits the fixed id width
    #[error("Identifier counter {counter} does not fit into {width} digits")]
    IdCapacity { counter: u64, width: usize },

    /// An external id is too long to be embedded into a generated id
    #[error("External id {external_id:?} is longer than the {max} bytes available for embedding")]
    ExternalIdTooLong { external_id: String, max: usize },

    /// An attachment with this name is already stored in the document
    #[error("Attachment {0:?} already exists")]
    DuplicateAttachment(String),
}

impl Error {
    /// Whether this error reports a missing or ambiguous element in the document tree.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::MissingElement { .. } | Error::AmbiguousElement { .. }
        )
    }
}

/// Result type for loquat operations.
pub type Result<T> = std::result::Result<T, Error>;
