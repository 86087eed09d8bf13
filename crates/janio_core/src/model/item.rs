//! Item domain model.
//!
//! # Responsibility
//! - Define the list item record and its category-dependent shape.
//! - Own id generation, title normalization and draft defaults.
//!
//! # Invariants
//! - `id` is non-empty and unique within its category bucket.
//! - `title` is never blank; blank input becomes `DEFAULT_TITLE`.
//! - `order` is a positive rank.
//! - `ItemKind::Task` appears iff the owning category is task-like.
//!
//! # See also
//! - model::mutation for the wire payloads carrying items.

use crate::model::category::CategoryId;
use crate::model::validation::{validate_due_date, validate_order, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Placeholder title for blank input.
pub const DEFAULT_TITLE: &str = "Untitled item";

/// Client-assigned item identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Generates a random id (UUID v4 text).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps caller-provided text, rejecting blank ids.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category-dependent part of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    /// Item of a plain category; has no due date at all.
    Plain,
    /// Item of a task-like category; `due_date` may be empty.
    Task { due_date: String },
}

/// One entry of a category list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ItemRecord", into = "ItemRecord")]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub description: String,
    /// Display rank within the category, starting at 1.
    pub order: u32,
    pub kind: ItemKind,
}

impl Item {
    /// Returns the due date for task items.
    pub fn due_date(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Plain => None,
            ItemKind::Task { due_date } => Some(due_date.as_str()),
        }
    }

    /// Reshapes the item for membership in `category`.
    ///
    /// Plain items moved into a task-like category get an empty due date;
    /// task items moved into a plain category lose theirs.
    pub fn conform_to(mut self, category: CategoryId) -> Self {
        self.kind = match (self.kind, category.is_task_like()) {
            (ItemKind::Plain, true) => ItemKind::Task {
                due_date: String::new(),
            },
            (ItemKind::Task { .. }, false) => ItemKind::Plain,
            (kind, _) => kind,
        };
        self
    }

    /// Replaces a blank title with the placeholder and trims the rest.
    pub fn with_normalized_title(mut self) -> Self {
        self.title = normalize_title(Some(self.title.as_str()));
        self
    }

    /// Checks the persisted-record rules.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        validate_order(self.order)?;
        if let Some(due_date) = self.due_date() {
            validate_due_date(due_date)?;
        }
        Ok(())
    }

    /// The `{id, order}` pair sent by reorder batches.
    pub fn order_entry(&self) -> OrderEntry {
        OrderEntry {
            id: self.id.clone(),
            order: self.order,
        }
    }
}

/// Reorder batch entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    pub id: ItemId,
    pub order: u32,
}

/// Flat wire shape of an item; `dueDate` is omitted for plain items.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ItemRecord {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    order: u32,
    #[serde(rename = "dueDate", default, skip_serializing_if = "Option::is_none")]
    due_date: Option<String>,
}

impl TryFrom<ItemRecord> for Item {
    type Error = ValidationError;

    fn try_from(record: ItemRecord) -> Result<Self, Self::Error> {
        let item = Item {
            id: ItemId::parse(record.id)?,
            title: record.title,
            description: record.description,
            order: record.order,
            kind: match record.due_date {
                Some(due_date) => ItemKind::Task { due_date },
                None => ItemKind::Plain,
            },
        };
        item.validate()?;
        Ok(item)
    }
}

impl From<Item> for ItemRecord {
    fn from(item: Item) -> Self {
        let due_date = match item.kind {
            ItemKind::Plain => None,
            ItemKind::Task { due_date } => Some(due_date),
        };
        Self {
            id: item.id.0,
            title: item.title,
            description: item.description,
            order: item.order,
            due_date,
        }
    }
}

/// Partial fields supplied when creating an item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDraft {
    /// Blank or missing ids are replaced by a generated one.
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub order: Option<u32>,
    /// Ignored for plain categories.
    pub due_date: Option<String>,
}

impl ItemDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Builds a complete item for `category`, filling defaults.
    ///
    /// `default_order` is used when the draft carries no order.
    pub fn into_item(
        self,
        category: CategoryId,
        default_order: u32,
    ) -> Result<Item, ValidationError> {
        let id = match self.id {
            Some(id) if !id.trim().is_empty() => ItemId(id),
            _ => ItemId::generate(),
        };
        let order = validate_order(self.order.unwrap_or(default_order))?;

        let kind = if category.is_task_like() {
            let due_date = self.due_date.unwrap_or_default();
            validate_due_date(&due_date)?;
            ItemKind::Task { due_date }
        } else {
            ItemKind::Plain
        };

        Ok(Item {
            id,
            title: normalize_title(self.title.as_deref()),
            description: self.description.unwrap_or_default(),
            order,
            kind,
        })
    }
}

/// Trims a title, substituting the placeholder for blank or missing input.
pub fn normalize_title(title: Option<&str>) -> String {
    match title.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
        _ => DEFAULT_TITLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_title, Item, ItemDraft, ItemId, ItemKind, DEFAULT_TITLE};
    use crate::model::category::CategoryId;

    #[test]
    fn normalize_title_trims_and_substitutes_placeholder() {
        assert_eq!(normalize_title(Some("  groceries ")), "groceries");
        assert_eq!(normalize_title(Some(" \t ")), DEFAULT_TITLE);
        assert_eq!(normalize_title(None), DEFAULT_TITLE);
    }

    #[test]
    fn draft_keeps_supplied_id_and_generates_for_blank() {
        let kept = ItemDraft {
            id: Some("fixed".to_string()),
            ..ItemDraft::default()
        }
        .into_item(CategoryId::Notes, 1)
        .unwrap();
        assert_eq!(kept.id.as_str(), "fixed");

        let generated = ItemDraft {
            id: Some("   ".to_string()),
            ..ItemDraft::default()
        }
        .into_item(CategoryId::Notes, 1)
        .unwrap();
        assert!(!generated.id.as_str().trim().is_empty());
        assert_ne!(generated.id.as_str(), "   ");
    }

    #[test]
    fn draft_drops_due_date_for_plain_categories() {
        let draft = ItemDraft {
            due_date: Some("2026-01-01".to_string()),
            ..ItemDraft::titled("read")
        };
        let item = draft.into_item(CategoryId::InterestingStuff, 3).unwrap();
        assert_eq!(item.kind, ItemKind::Plain);
        assert_eq!(item.order, 3);
    }

    #[test]
    fn conform_to_switches_kind_by_category() {
        let item = ItemDraft::titled("x")
            .into_item(CategoryId::Notes, 1)
            .unwrap();
        let task = item.conform_to(CategoryId::Tasks);
        assert_eq!(task.due_date(), Some(""));
        let plain = task.conform_to(CategoryId::Notes);
        assert_eq!(plain.due_date(), None);
    }

    #[test]
    fn serialization_omits_due_date_for_plain_items() {
        let plain = ItemDraft::titled("x")
            .into_item(CategoryId::Notes, 1)
            .unwrap();
        let json = serde_json::to_value(&plain).unwrap();
        assert!(json.get("dueDate").is_none());

        let task = ItemDraft::titled("y")
            .into_item(CategoryId::Tasks, 1)
            .unwrap();
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["dueDate"], "");
    }

    #[test]
    fn deserialization_rejects_invalid_records() {
        let zero_order = r#"{"id":"a","title":"t","description":"","order":0}"#;
        assert!(serde_json::from_str::<Item>(zero_order).is_err());

        let blank_id = r#"{"id":" ","title":"t","order":1}"#;
        assert!(serde_json::from_str::<Item>(blank_id).is_err());

        let ok = r#"{"id":"a","title":"t","order":2,"dueDate":"2026-05-01"}"#;
        let item: Item = serde_json::from_str(ok).unwrap();
        assert_eq!(item.id, ItemId::parse("a").unwrap());
        assert_eq!(item.description, "");
        assert_eq!(item.due_date(), Some("2026-05-01"));
    }
}
