//! Domain model definitions for Jan.io core.
//!
//! # Responsibility
//! - Define the category catalog, list items and store mutation payloads.
//! - Keep validation rules next to the types they guard.
//!
//! # Invariants
//! - Model types encode category-dependent shape (`ItemKind`) instead of
//!   optional fields checked ad hoc.

pub mod category;
pub mod item;
pub mod mutation;
pub mod validation;
