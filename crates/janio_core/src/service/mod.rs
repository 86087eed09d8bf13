//! Content use-case services.
//!
//! # Responsibility
//! - Keep the optimistic in-memory content state and replicate it to a store.
//! - Provide the drag-and-drop reorder computation.

pub mod content_manager;
pub mod reorder;
