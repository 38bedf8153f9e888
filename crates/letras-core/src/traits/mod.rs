//! Core traits defined in `letras-core` and implemented by other crates.

pub mod store;

pub use store::DocumentStore;
