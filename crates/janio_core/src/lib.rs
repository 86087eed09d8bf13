//! Core of the Jan.io organizer.
//! Holds the category/item model, store adapters and the content manager
//! that keeps local list state in step with the store.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError, ManagerConfig, StoreBackend};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::category::{category_by_id, Category, CategoryId, CATEGORIES};
pub use model::item::{
    normalize_title, Item, ItemDraft, ItemId, ItemKind, OrderEntry, DEFAULT_TITLE,
};
pub use model::mutation::Mutation;
pub use model::validation::ValidationError;
pub use notify::{LogNotifier, Notice, NoticeKind, Notifier, Toast, ToastQueue};
pub use repo::item_store::{ItemStore, StoreError, StoreResult};
pub use repo::json_file_store::JsonFileItemStore;
pub use repo::sqlite_store::SqliteItemStore;
pub use service::content_manager::{ContentManager, LoadReport, LoadTicket};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
