//! Repositories over the document store.

pub mod collection;

pub use collection::{CollectionRepository, DeleteOutcome};
