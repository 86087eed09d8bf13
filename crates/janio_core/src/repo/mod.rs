//! Remote store adapters behind the `ItemStore` contract.
//!
//! # Responsibility
//! - Define the query/write primitives the content manager depends on.
//! - Provide SQLite and JSON-file implementations of that contract.
//!
//! # Invariants
//! - Every adapter runs `Mutation::validate()` before writing.
//! - Listings are ordered by `order` ascending, ties by insertion order.
//! - Reorder batches are all-or-nothing.

pub mod item_store;
pub mod json_file_store;
pub mod sqlite_store;
