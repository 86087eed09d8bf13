//! Runtime configuration for hosts embedding the core.
//!
//! # Responsibility
//! - Describe which store backend to open and how to log.
//! - Derive the content manager's startup options.
//!
//! # Invariants
//! - A validated `AppConfig` has non-empty store paths, an absolute log
//!   directory (when set) and a supported log level.

use crate::logging::{default_log_level, normalize_level};
use crate::model::category::{Category, CategoryId, CATEGORIES};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Active category when nothing else is configured.
pub const FALLBACK_CATEGORY: CategoryId = CategoryId::Notes;

/// Startup options for `ContentManager`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Categories loaded by `ContentManager::reload`.
    pub categories: Vec<Category>,
    pub default_category: Option<CategoryId>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            categories: CATEGORIES.to_vec(),
            default_category: Some(FALLBACK_CATEGORY),
        }
    }
}

impl ManagerConfig {
    /// Default category, else the first configured one, else `notes`.
    pub fn initial_category(&self) -> CategoryId {
        self.default_category
            .or_else(|| self.categories.first().map(|category| category.id))
            .unwrap_or(FALLBACK_CATEGORY)
    }
}

/// Where items are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// SQLite database file.
    Sqlite { path: PathBuf },
    /// Directory of `<category>.json` documents.
    JsonFiles { dir: PathBuf },
}

/// Host-level configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub store: StoreBackend,
    pub log_level: String,
    /// Rolling log directory; logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
    pub default_category: CategoryId,
}

impl AppConfig {
    pub fn new(store: StoreBackend) -> Self {
        Self {
            store,
            log_level: default_log_level().to_string(),
            log_dir: None,
            default_category: FALLBACK_CATEGORY,
        }
    }

    /// Checks paths and normalizes the log level.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let store_path = match &self.store {
            StoreBackend::Sqlite { path } => path,
            StoreBackend::JsonFiles { dir } => dir,
        };
        if store_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyStorePath);
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }
        self.log_level = normalize_level(&self.log_level)
            .map_err(|_| ConfigError::UnsupportedLogLevel(self.log_level.clone()))?
            .to_string();
        Ok(self)
    }

    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            categories: CATEGORIES.to_vec(),
            default_category: Some(self.default_category),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyStorePath,
    RelativeLogDir(PathBuf),
    UnsupportedLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyStorePath => write!(f, "store path cannot be empty"),
            Self::RelativeLogDir(dir) => {
                write!(f, "log dir must be an absolute path, got `{}`", dir.display())
            }
            Self::UnsupportedLogLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
        }
    }
}

impl Error for ConfigError {}
