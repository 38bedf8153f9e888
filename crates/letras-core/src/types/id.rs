//! Record identifiers.
//!
//! Identifiers are opaque strings. Records created through the repository
//! get a UUID v4 in its simple (hyphen-free) form, but any non-empty string
//! a store hands back is accepted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Identifier of a record within its collection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create a new random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wrap an identifier, rejecting empty or whitespace-only input.
    pub fn parse(raw: impl Into<String>) -> Result<Self, AppError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(AppError::validation("Record id must not be empty"));
        }
        Ok(Self(raw))
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_unique() {
        let id1 = RecordId::generate();
        let id2 = RecordId::generate();
        assert_ne!(id1, id2);
        assert_eq!(id1.as_str().len(), 32);
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert!(RecordId::parse("").is_err());
        assert!(RecordId::parse("   ").is_err());
        assert_eq!(RecordId::parse("abc").map(|id| id.into_string()).ok(), Some("abc".to_string()));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id: RecordId = "book-1".parse().expect("should parse");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"book-1\"");
    }
}
