//! Keyed queries against a single collection.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::id::RecordId;
use crate::types::ordering::compare_values;
use crate::types::record::StoredRecord;
use crate::types::sorting::SortField;

/// Position in an ordered collection: the ordering value and id of the last
/// record already seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    /// Value of the ordering field on the last seen record.
    pub value: Value,
    /// Id of the last seen record; breaks ties on `value`.
    pub id: RecordId,
}

impl Cursor {
    /// Build a cursor positioned on `record` for the given ordering field.
    pub fn at(record: &StoredRecord, order_field: &str) -> Self {
        Self {
            value: record.field(order_field).clone(),
            id: record.id.clone(),
        }
    }
}

/// Equality filter on a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    /// Field name.
    pub field: String,
    /// Value the field must equal.
    pub value: Value,
}

impl FieldFilter {
    /// Shorthand for an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether `record` passes the filter.
    ///
    /// Values are equal when they compare equal as jsonb does, so `1` and
    /// `1.0` match.
    pub fn matches(&self, record: &StoredRecord) -> bool {
        if self.field == crate::types::record::ID_FIELD {
            return self.value.as_str() == Some(record.id.as_str());
        }
        compare_values(record.field(&self.field), &self.value) == Ordering::Equal
    }
}

/// An ordered, optionally filtered, optionally bounded read of a collection.
///
/// Records are ordered by `order_by`, ties broken by id in the same
/// direction. When `after` is set only records strictly past the cursor are
/// returned.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentQuery {
    /// Ordering key.
    pub order_by: SortField,
    /// Equality filter.
    pub filter: Option<FieldFilter>,
    /// Resume strictly after this position.
    pub after: Option<Cursor>,
    /// Maximum number of records to return.
    pub limit: Option<u64>,
}

impl DocumentQuery {
    /// Query ordering by `order_by` with no filter, cursor, or limit.
    pub fn ordered_by(order_by: SortField) -> Self {
        Self {
            order_by,
            filter: None,
            after: None,
            limit: None,
        }
    }

    /// Restrict to records whose `field` equals `value`.
    pub fn filter(mut self, filter: FieldFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Resume after `cursor`.
    pub fn after(mut self, cursor: Cursor) -> Self {
        self.after = Some(cursor);
        self
    }

    /// Return at most `limit` records.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Compare two records under this query's ordering.
    pub fn compare(&self, a: &StoredRecord, b: &StoredRecord) -> Ordering {
        let field = &self.order_by.field;
        let ord = compare_values(a.field(field), b.field(field)).then_with(|| a.id.cmp(&b.id));
        self.order_by.direction.apply(ord)
    }

    fn is_past_cursor(&self, record: &StoredRecord, cursor: &Cursor) -> bool {
        let ord = compare_values(record.field(&self.order_by.field), &cursor.value)
            .then_with(|| record.id.cmp(&cursor.id));
        self.order_by.direction.apply(ord) == Ordering::Greater
    }

    /// Evaluate the query over an unordered set of records.
    ///
    /// Backends without native query support run queries through this.
    pub fn apply(&self, records: impl IntoIterator<Item = StoredRecord>) -> Vec<StoredRecord> {
        let mut matched: Vec<StoredRecord> = records
            .into_iter()
            .filter(|r| self.filter.as_ref().is_none_or(|f| f.matches(r)))
            .filter(|r| self.after.as_ref().is_none_or(|c| self.is_past_cursor(r, c)))
            .collect();
        matched.sort_by(|a, b| self.compare(a, b));
        if let Some(limit) = self.limit {
            matched.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        matched
    }
}
