//! Store adapter contract and error taxonomy.
//!
//! # Responsibility
//! - Define `ItemStore`, the only persistence surface the content manager
//!   sees.
//! - Classify transport/store failures (`StoreError`).
//!
//! # Invariants
//! - `list_by_category` returns records sorted by `order` ascending.
//! - `apply_mutation` either applies the whole mutation or nothing.
//! - No optimistic-concurrency token exists; concurrent writers
//!   last-write-win.

use crate::db::DbError;
use crate::model::category::CategoryId;
use crate::model::item::{Item, ItemId};
use crate::model::mutation::Mutation;
use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a store adapter.
#[derive(Debug)]
pub enum StoreError {
    /// Payload rejected at the adapter boundary.
    Validation(ValidationError),
    Db(DbError),
    Io(std::io::Error),
    Json(serde_json::Error),
    /// Create with an id that is already stored.
    AlreadyExists(ItemId),
    /// Update or reorder referencing a record that does not exist.
    NotFound(ItemId),
    /// Persisted state violates model invariants.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "{err}"),
            Self::AlreadyExists(id) => write!(f, "item already exists: {id}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::AlreadyExists(_) | Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Query/write primitives of the backing document store.
pub trait ItemStore {
    /// Returns the records of one category in display order.
    fn list_by_category(&self, category: CategoryId) -> StoreResult<Vec<Item>>;
    /// Validates and applies one mutation.
    fn apply_mutation(&self, mutation: &Mutation) -> StoreResult<()>;
}

impl<S: ItemStore + ?Sized> ItemStore for &S {
    fn list_by_category(&self, category: CategoryId) -> StoreResult<Vec<Item>> {
        (**self).list_by_category(category)
    }

    fn apply_mutation(&self, mutation: &Mutation) -> StoreResult<()> {
        (**self).apply_mutation(mutation)
    }
}

impl<S: ItemStore + ?Sized> ItemStore for Box<S> {
    fn list_by_category(&self, category: CategoryId) -> StoreResult<Vec<Item>> {
        (**self).list_by_category(category)
    }

    fn apply_mutation(&self, mutation: &Mutation) -> StoreResult<()> {
        (**self).apply_mutation(mutation)
    }
}
