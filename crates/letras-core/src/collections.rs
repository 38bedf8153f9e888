//! Descriptors for the library's document collections.
//!
//! The repository is schema-agnostic; these descriptors carry the few
//! per-collection rules the HTTP layer enforces (required fields, lookup
//! fields, envelope keys, listing limits) so that every collection is served
//! by the same handlers.

use serde_json::Value;

use crate::error::AppError;
use crate::types::record::{ID_FIELD, Record};

/// Static description of one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSpec {
    /// Collection name, also the URL segment and the plural envelope key.
    pub name: &'static str,
    /// Envelope key for a single record.
    pub singular: &'static str,
    /// Fields that must be present and non-empty on create.
    pub required_fields: &'static [&'static str],
    /// Fields that may be used for single-record lookups.
    pub lookup_fields: &'static [&'static str],
    /// String fields scanned by search.
    pub searchable_fields: &'static [&'static str],
    /// Whether the collection is small enough to be listed without paging.
    pub bounded: bool,
    /// Page size for this collection's listing, when it differs from the
    /// configured default.
    pub default_limit: Option<u64>,
}

/// A one-to-many link from a parent collection to a child collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    /// Parent collection name.
    pub parent: &'static str,
    /// Child collection name.
    pub child: &'static str,
    /// Field on the child holding the parent's id.
    pub field: &'static str,
}

/// Every collection the application serves.
pub static COLLECTIONS: &[CollectionSpec] = &[
    CollectionSpec {
        name: "books",
        singular: "book",
        required_fields: &["title", "author"],
        lookup_fields: &["isbn", "title"],
        searchable_fields: &["title", "author", "description", "genre"],
        bounded: false,
        default_limit: None,
    },
    CollectionSpec {
        name: "movies",
        singular: "movie",
        required_fields: &["title"],
        lookup_fields: &["title"],
        searchable_fields: &["title", "director", "description", "genre"],
        bounded: false,
        default_limit: None,
    },
    CollectionSpec {
        name: "events",
        singular: "event",
        required_fields: &["title", "date"],
        lookup_fields: &["title"],
        searchable_fields: &["title", "description"],
        bounded: true,
        default_limit: None,
    },
    CollectionSpec {
        name: "posts",
        singular: "post",
        required_fields: &["title", "content"],
        lookup_fields: &["title"],
        searchable_fields: &["title", "content", "author"],
        bounded: false,
        default_limit: None,
    },
    CollectionSpec {
        name: "comments",
        singular: "comment",
        required_fields: &["postId", "content"],
        lookup_fields: &[],
        searchable_fields: &["content", "author"],
        bounded: false,
        default_limit: Some(10),
    },
    CollectionSpec {
        name: "users",
        singular: "user",
        required_fields: &["name", "email"],
        lookup_fields: &["email"],
        searchable_fields: &["name", "email"],
        bounded: false,
        default_limit: None,
    },
    CollectionSpec {
        name: "prestamos",
        singular: "prestamo",
        required_fields: &["bookId", "userId"],
        lookup_fields: &[],
        searchable_fields: &[],
        bounded: false,
        default_limit: Some(10),
    },
    CollectionSpec {
        name: "categories",
        singular: "category",
        required_fields: &["name"],
        lookup_fields: &["name"],
        searchable_fields: &["name", "description"],
        bounded: true,
        default_limit: None,
    },
];

/// Every parent/child link the application serves.
pub static RELATIONS: &[Relation] = &[
    Relation {
        parent: "posts",
        child: "comments",
        field: "postId",
    },
    Relation {
        parent: "books",
        child: "prestamos",
        field: "bookId",
    },
    Relation {
        parent: "users",
        child: "prestamos",
        field: "userId",
    },
    Relation {
        parent: "categories",
        child: "books",
        field: "categoryId",
    },
];

/// Look up a collection by name.
pub fn find(name: &str) -> Option<&'static CollectionSpec> {
    COLLECTIONS.iter().find(|spec| spec.name == name)
}

/// Look up a relation by parent and child collection names.
pub fn relation(parent: &str, child: &str) -> Option<&'static Relation> {
    RELATIONS
        .iter()
        .find(|rel| rel.parent == parent && rel.child == child)
}

impl CollectionSpec {
    /// Whether `field` may be used for single-record lookups.
    pub fn is_lookup_field(&self, field: &str) -> bool {
        field == ID_FIELD || self.lookup_fields.contains(&field)
    }

    /// Check the fields of a record about to be created.
    ///
    /// The record must not carry an `id` (one is assigned on create) and must
    /// have every required field present, non-null, and not an empty string.
    pub fn validate_new(&self, fields: &Record) -> Result<(), AppError> {
        if fields.contains_key(ID_FIELD) {
            return Err(AppError::validation(format!(
                "A new {} must not carry an id; one is assigned on create",
                self.singular
            )));
        }
        let missing: Vec<&str> = self
            .required_fields
            .iter()
            .copied()
            .filter(|field| is_blank(fields.get(*field)))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::validation(format!(
                "Missing required field(s) for {}: {}",
                self.singular,
                missing.join(", ")
            )));
        }
        Ok(())
    }

    /// Check a partial update: required fields may be omitted but not blanked.
    pub fn validate_patch(&self, fields: &Record) -> Result<(), AppError> {
        if fields.is_empty() {
            return Err(AppError::validation("Update must contain at least one field"));
        }
        let blanked: Vec<&str> = self
            .required_fields
            .iter()
            .copied()
            .filter(|field| fields.contains_key(*field) && is_blank(fields.get(*field)))
            .collect();
        if !blanked.is_empty() {
            return Err(AppError::validation(format!(
                "Required field(s) cannot be cleared: {}",
                blanked.join(", ")
            )));
        }
        Ok(())
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}
