//! Payload validation rules shared by the model, stores and manager.
//!
//! # Responsibility
//! - Define the synchronous rejection taxonomy (`ValidationError`).
//! - Provide field-level checks for ids, orders and due dates.
//!
//! # Invariants
//! - Validation never touches state; callers reject before mutating.
//! - Fractional orders are floored before the positivity check.

use chrono::{DateTime, NaiveDate};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejection raised before any local or remote state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Category id outside the fixed catalog.
    UnknownCategory(String),
    /// Mutation `action` outside `create|update|delete|reorder`.
    UnknownAction(String),
    /// Required payload field missing or of the wrong JSON type.
    MissingField(&'static str),
    /// Item id is empty or whitespace.
    EmptyId,
    /// Item title is empty or whitespace.
    EmptyTitle,
    /// Order is not a positive integer.
    InvalidOrder(String),
    /// Due date is neither empty nor a parseable date.
    InvalidDueDate(String),
    /// The same id appears twice in one reorder sequence.
    DuplicateId(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownCategory(value) => write!(f, "unknown category `{value}`"),
            Self::UnknownAction(value) => write!(f, "unknown mutation action `{value}`"),
            Self::MissingField(field) => write!(f, "missing or invalid field `{field}`"),
            Self::EmptyId => write!(f, "item id must be a non-empty string"),
            Self::EmptyTitle => write!(f, "item title must be a non-empty string"),
            Self::InvalidOrder(value) => {
                write!(f, "order must be a positive integer, got `{value}`")
            }
            Self::InvalidDueDate(value) => write!(f, "invalid due date `{value}`"),
            Self::DuplicateId(value) => write!(f, "duplicate item id `{value}` in sequence"),
        }
    }
}

impl Error for ValidationError {}

/// Checks that an order value is a positive rank.
pub fn validate_order(order: u32) -> Result<u32, ValidationError> {
    if order == 0 {
        return Err(ValidationError::InvalidOrder(order.to_string()));
    }
    Ok(order)
}

/// Floors a JSON number into an order, rejecting non-positive results.
pub fn order_from_number(value: f64) -> Result<u32, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidOrder(value.to_string()));
    }
    let floored = value.floor();
    if floored < 1.0 || floored > f64::from(u32::MAX) {
        return Err(ValidationError::InvalidOrder(value.to_string()));
    }
    Ok(floored as u32)
}

/// Accepts an empty string, a calendar date or an RFC 3339 timestamp.
pub fn validate_due_date(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    if NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(trimmed).is_ok()
    {
        return Ok(());
    }
    Err(ValidationError::InvalidDueDate(value.to_string()))
}
