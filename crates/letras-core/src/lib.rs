//! # letras-core
//!
//! Core crate for Letras Documental. Contains configuration schemas, the
//! unified error system, record and pagination types, the document store
//! contract, and the descriptors of the library's document collections.
//!
//! This crate has **no** internal dependencies on other Letras crates.

pub mod collections;
pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
