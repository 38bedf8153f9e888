//! Core type definitions used across the Letras workspace.

pub mod id;
pub mod ordering;
pub mod pagination;
pub mod query;
pub mod record;
pub mod sorting;

pub use id::RecordId;
pub use ordering::compare_values;
pub use pagination::{Page, PageRequest};
pub use query::{Cursor, DocumentQuery, FieldFilter};
pub use record::{Record, StoredRecord};
pub use sorting::{SortDirection, SortField};
