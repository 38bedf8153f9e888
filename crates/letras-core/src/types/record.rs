//! Schemaless records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::id::RecordId;

/// Field name under which a record carries its own identifier.
pub const ID_FIELD: &str = "id";

/// A schemaless document: string keys mapped to JSON values.
pub type Record = serde_json::Map<String, Value>;

/// A record as held by a document store: the store key plus the stored fields.
///
/// The key and the `id` field normally agree. They can diverge while a
/// two-phase create has inserted the record but not yet written the id back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Store-assigned key.
    pub id: RecordId,
    /// Stored fields.
    pub fields: Record,
}

impl StoredRecord {
    /// Create a stored record.
    pub fn new(id: RecordId, fields: Record) -> Self {
        Self { id, fields }
    }

    /// Whether the stored fields carry the record's own id.
    pub fn has_id_field(&self) -> bool {
        self.fields.get(ID_FIELD).and_then(Value::as_str) == Some(self.id.as_str())
    }

    /// The fields with `id` set from the store key, as returned to callers.
    pub fn into_record(self) -> Record {
        let mut fields = self.fields;
        fields.insert(ID_FIELD.to_string(), Value::String(self.id.into_string()));
        fields
    }

    /// Value of a field, `Null` when absent.
    pub fn field(&self, name: &str) -> &Value {
        self.fields.get(name).unwrap_or(&Value::Null)
    }
}

/// Shallow merge: every top-level key in `patch` replaces the key in `base`.
///
/// Nested objects are replaced wholesale, never merged.
pub fn merge_shallow(base: &mut Record, patch: Record) {
    for (key, value) in patch {
        base.insert(key, value);
    }
}

/// Convert a JSON value into a record, rejecting anything but an object.
pub fn record_from_value(value: Value) -> Option<Record> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
