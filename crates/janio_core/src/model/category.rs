//! Category catalog.
//!
//! # Responsibility
//! - Define the fixed set of list categories and their display names.
//! - Mark which categories are task-like (carry due dates).
//!
//! # Invariants
//! - The catalog is closed; categories are not user-editable.
//! - Wire ids are stable snake_case strings.

use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Stable identifier of one list category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryId {
    Notes,
    Tasks,
    WorkTasks,
    InterestingStuff,
}

impl CategoryId {
    /// Wire id used by stores and payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notes => "notes",
            Self::Tasks => "tasks",
            Self::WorkTasks => "work_tasks",
            Self::InterestingStuff => "interesting_stuff",
        }
    }

    /// Tab label.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Notes => "Notes",
            Self::Tasks => "Tasks",
            Self::WorkTasks => "Work Tasks",
            Self::InterestingStuff => "Interesting Stuff",
        }
    }

    /// Whether items of this category carry a due date.
    pub fn is_task_like(self) -> bool {
        matches!(self, Self::Tasks | Self::WorkTasks)
    }

    /// Parses a wire id, rejecting anything outside the catalog.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim() {
            "notes" => Ok(Self::Notes),
            "tasks" => Ok(Self::Tasks),
            "work_tasks" => Ok(Self::WorkTasks),
            "interesting_stuff" => Ok(Self::InterestingStuff),
            other => Err(ValidationError::UnknownCategory(other.to_string())),
        }
    }
}

impl Display for CategoryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Immutable category descriptor shown as one tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: &'static str,
}

impl Category {
    pub fn is_task_like(&self) -> bool {
        self.id.is_task_like()
    }
}

/// The full catalog in tab order.
pub const CATEGORIES: [Category; 4] = [
    Category {
        id: CategoryId::Notes,
        name: "Notes",
    },
    Category {
        id: CategoryId::Tasks,
        name: "Tasks",
    },
    Category {
        id: CategoryId::WorkTasks,
        name: "Work Tasks",
    },
    Category {
        id: CategoryId::InterestingStuff,
        name: "Interesting Stuff",
    },
];

/// Looks up the descriptor for one id.
pub fn category_by_id(id: CategoryId) -> Category {
    Category {
        id,
        name: id.display_name(),
    }
}
