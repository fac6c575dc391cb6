//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert errors of the
//! XML and ZIP backends to the unified Error type.

use super::types::Error;

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlError(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlError(err.to_string())
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::XmlError(format!("Invalid UTF-8: {}", err))
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_classification() {
        let missing = Error::MissingElement {
            tag: "topic".to_string(),
            parent: "sheet".to_string(),
            known: "title".to_string(),
        };
        assert!(missing.is_structural());

        let ambiguous = Error::AmbiguousElement {
            tag: "title".to_string(),
            parent: "topic".to_string(),
            count: 2,
        };
        assert!(ambiguous.is_structural());

        assert!(!Error::InvalidFile("x.xmind".to_string()).is_structural());
    }

    #[test]
    fn test_zip_error_conversion() {
        let err: Error = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(err, Error::ZipError(_)));
    }
}
