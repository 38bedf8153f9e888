//! # letras-database
//!
//! Document store backends (in-memory and PostgreSQL), connection
//! management, and the generic collection repository that every Letras
//! collection is served through.

pub mod connection;
pub mod repositories;
pub mod store;

pub use connection::{DatabasePool, connect};
pub use repositories::{CollectionRepository, DeleteOutcome};
pub use store::{MemoryDocumentStore, PgDocumentStore, StoreOp, TimedStore};
