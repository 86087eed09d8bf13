//! Store mutation payloads and their JSON wire form.
//!
//! # Responsibility
//! - Define the four mutation actions sent to a store adapter.
//! - Parse untrusted JSON payloads into typed mutations.
//! - Enforce boundary validation shared by every adapter.
//!
//! # Invariants
//! - A `Mutation` returned by `from_json` has already passed `validate`.
//! - Reorder batches carry only `{id, order}` pairs.
//!
//! # See also
//! - repo::item_store for the adapter contract.

use crate::model::category::CategoryId;
use crate::model::item::{Item, ItemId, ItemKind, OrderEntry};
use crate::model::validation::{
    order_from_number, validate_due_date, validate_order, ValidationError,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// One write request against a category partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Mutation {
    /// Persists a new record; the item carries its client-assigned id.
    Create { category: CategoryId, item: Item },
    /// Replaces all fields of the record with the same id.
    Update { category: CategoryId, item: Item },
    /// Removes one record.
    Delete {
        category: CategoryId,
        #[serde(rename = "itemId")]
        item_id: ItemId,
    },
    /// Rewrites `order` for every listed record as one batch.
    Reorder {
        category: CategoryId,
        items: Vec<OrderEntry>,
    },
}

impl Mutation {
    /// Wire name of the action.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Reorder { .. } => "reorder",
        }
    }

    pub fn category(&self) -> CategoryId {
        match self {
            Self::Create { category, .. }
            | Self::Update { category, .. }
            | Self::Delete { category, .. }
            | Self::Reorder { category, .. } => *category,
        }
    }

    /// Applies the boundary rules every adapter enforces before writing.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Create { item, .. } | Self::Update { item, .. } => item.validate(),
            Self::Delete { item_id, .. } => {
                if item_id.as_str().trim().is_empty() {
                    return Err(ValidationError::EmptyId);
                }
                Ok(())
            }
            Self::Reorder { items, .. } => validate_order_entries(items),
        }
    }

    /// Serializes to the `{action, category, ...}` wire object.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Parses and validates an untrusted wire payload.
    ///
    /// Fractional orders are floored; unknown actions and categories are
    /// rejected.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let object = value
            .as_object()
            .ok_or(ValidationError::MissingField("action"))?;
        let action = required_str(object, "action")?;
        let category = CategoryId::parse(required_str(object, "category")?)?;

        let mutation = match action {
            "create" => Self::Create {
                category,
                item: parse_item(object.get("item"), category)?,
            },
            "update" => Self::Update {
                category,
                item: parse_item(object.get("item"), category)?,
            },
            "delete" => Self::Delete {
                category,
                item_id: ItemId::parse(required_str(object, "itemId")?)?,
            },
            "reorder" => {
                let entries = object
                    .get("items")
                    .and_then(Value::as_array)
                    .ok_or(ValidationError::MissingField("items"))?;
                Self::Reorder {
                    category,
                    items: entries
                        .iter()
                        .map(parse_order_entry)
                        .collect::<Result<Vec<_>, _>>()?,
                }
            }
            other => return Err(ValidationError::UnknownAction(other.to_string())),
        };

        mutation.validate()?;
        Ok(mutation)
    }
}

/// Checks a reorder batch: non-empty unique ids, positive orders.
pub fn validate_order_entries(entries: &[OrderEntry]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if entry.id.as_str().trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        validate_order(entry.order)?;
        if !seen.insert(entry.id.as_str()) {
            return Err(ValidationError::DuplicateId(entry.id.to_string()));
        }
    }
    Ok(())
}

fn required_str<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    object
        .get(field)
        .and_then(Value::as_str)
        .ok_or(ValidationError::MissingField(field))
}

fn parse_order(object: &Map<String, Value>) -> Result<u32, ValidationError> {
    let value = object
        .get("order")
        .ok_or(ValidationError::MissingField("order"))?;
    let number = value
        .as_f64()
        .ok_or_else(|| ValidationError::InvalidOrder(value.to_string()))?;
    order_from_number(number)
}

fn parse_item(value: Option<&Value>, category: CategoryId) -> Result<Item, ValidationError> {
    let object = value
        .and_then(Value::as_object)
        .ok_or(ValidationError::MissingField("item"))?;

    let id = ItemId::parse(required_str(object, "id")?)?;
    let title = required_str(object, "title")?;
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    let description = match object.get("description") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(_) => return Err(ValidationError::MissingField("description")),
    };
    let kind = match object.get("dueDate") {
        None | Some(Value::Null) => ItemKind::Plain,
        Some(Value::String(due_date)) => {
            validate_due_date(due_date)?;
            ItemKind::Task {
                due_date: due_date.clone(),
            }
        }
        Some(other) => return Err(ValidationError::InvalidDueDate(other.to_string())),
    };

    let item = Item {
        id,
        title: title.to_string(),
        description,
        order: parse_order(object)?,
        kind,
    };
    Ok(item.conform_to(category))
}

fn parse_order_entry(value: &Value) -> Result<OrderEntry, ValidationError> {
    let object = value
        .as_object()
        .ok_or(ValidationError::MissingField("items"))?;
    Ok(OrderEntry {
        id: ItemId::parse(required_str(object, "id")?)?,
        order: parse_order(object)?,
    })
}
