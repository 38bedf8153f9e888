//! Route handlers organized by domain.

pub mod collections;
pub mod feed;
pub mod health;
pub mod search;
