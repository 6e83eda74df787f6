//! core type-safe wrappers for the storage layer.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A validated collection name.
///
/// Collection names are used as directory names, so they are restricted to
/// prevent path traversal and ensure filesystem compatibility.
///
/// Valid names:
/// - 1-64 characters
/// - Alphanumeric, underscores, hyphens only
/// - Cannot be reserved names (_meta, _system, etc.)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionName(String);

impl CollectionName {
    /// reserved collection names that can't be used
    const RESERVED: &'static [&'static str] = &["_meta", "_system", "_tmp"];

    /// create a new CollectionName, validating the input
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidNameError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Validate a collection name.
    fn validate(name: &str) -> Result<(), InvalidNameError> {
        if name.is_empty() {
            return Err(InvalidNameError::Empty);
        }

        if name.len() > 64 {
            return Err(InvalidNameError::TooLong(name.len()));
        }

        for (i, c) in name.chars().enumerate() {
            if !c.is_ascii_alphanumeric() && c != '_' && c != '-' {
                return Err(InvalidNameError::InvalidCharacter { char: c, position: i });
            }
        }

        if Self::RESERVED.contains(&name.to_lowercase().as_str()) {
            return Err(InvalidNameError::Reserved(name.to_string()));
        }

        Ok(())
    }

    /// get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// convert to owned String
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated document id.
///
/// document ids are used as filenames, so they have similar restrictions to
/// collection names. For products the natural key (`product_id`) is used;
/// otherwise ids are auto generated (ULIDs).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidNameError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Validate a document id.
    fn validate(id: &str) -> Result<(), InvalidNameError> {
        if id.is_empty() {
            return Err(InvalidNameError::Empty);
        }

        if id.len() > 128 {
            return Err(InvalidNameError::TooLong(id.len()));
        }

        for (i, c) in id.chars().enumerate() {
            // alphanumeric, underscore, hyphen allowed
            if !c.is_ascii_alphanumeric() && c != '_' && c != '-' {
                return Err(InvalidNameError::InvalidCharacter { char: c, position: i });
            }
        }

        Ok(())
    }

    /// get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// convert to owned String
    pub fn into_string(self) -> String {
        self.0
    }

    /// Generate a new ULID-based document id.
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// errors for invalid collection names and document ids
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidNameError {
    #[error("name cannot be empty")]
    Empty,

    #[error("name too long: {0} characters")]
    TooLong(usize),

    #[error("invalid character '{char}' at position {position}")]
    InvalidCharacter { char: char, position: usize },

    #[error("reserved name: {0}")]
    Reserved(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_collection_names() {
        assert!(CollectionName::new("products").is_ok());
        assert!(CollectionName::new("order_items").is_ok());
        assert!(CollectionName::new("a-b-c").is_ok());
    }

    #[test]
    fn test_invalid_collection_names() {
        assert_eq!(CollectionName::new("").unwrap_err(), InvalidNameError::Empty);
        assert!(matches!(
            CollectionName::new("no/slashes").unwrap_err(),
            InvalidNameError::InvalidCharacter { char: '/', .. }
        ));
        assert!(matches!(
            CollectionName::new("_meta").unwrap_err(),
            InvalidNameError::Reserved(_)
        ));
        assert!(matches!(
            CollectionName::new("x".repeat(65)).unwrap_err(),
            InvalidNameError::TooLong(65)
        ));
    }

    #[test]
    fn test_document_id_natural_key() {
        let id = DocumentId::new("ELEC001").unwrap();
        assert_eq!(id.as_str(), "ELEC001");
    }

    #[test]
    fn test_document_id_generate() {
        let a = DocumentId::generate();
        let b = DocumentId::generate();
        assert_ne!(a, b);
        // ULIDs are valid filenames
        assert!(DocumentId::new(a.as_str()).is_ok());
    }

    #[test]
    fn test_document_id_rejects_path_traversal() {
        assert!(DocumentId::new("../escape").is_err());
        assert!(DocumentId::new("a.json").is_err());
    }
}
