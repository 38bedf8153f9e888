//! [`DocumentStore`](letras_core::traits::DocumentStore) backends.

pub mod memory;
pub mod postgres;
pub mod timeout;

pub use memory::{MemoryDocumentStore, StoreOp};
pub use postgres::PgDocumentStore;
pub use timeout::TimedStore;
