//! CLI failure taxonomy and exit codes.

use janio_core::db::DbError;
use janio_core::{CategoryId, ConfigError, LoggingError, StoreError, ValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::process::ExitCode;

/// Exit code for rejected input.
const USAGE_EXIT_CODE: u8 = 2;

#[derive(Debug)]
pub(crate) enum CliError {
    Config(ConfigError),
    Logging(LoggingError),
    Db(DbError),
    Store(StoreError),
    Validation(ValidationError),
    /// `apply` payload is not JSON.
    Payload(serde_json::Error),
    /// Output serialization failed.
    Output(serde_json::Error),
    Io(std::io::Error),
    UnknownItem { category: CategoryId, id: String },
    /// `move` positions are 1-based.
    InvalidPosition(usize),
}

impl CliError {
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_)
            | Self::Validation(_)
            | Self::Payload(_)
            | Self::UnknownItem { .. }
            | Self::InvalidPosition(_) => ExitCode::from(USAGE_EXIT_CODE),
            _ => ExitCode::FAILURE,
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Payload(err) => write!(f, "mutation payload is not valid JSON: {err}"),
            Self::Output(err) => write!(f, "failed to render output: {err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::UnknownItem { category, id } => {
                write!(f, "no item `{id}` in category `{category}`")
            }
            Self::InvalidPosition(position) => {
                write!(f, "position must be 1 or greater, got {position}")
            }
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Payload(err) | Self::Output(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::UnknownItem { .. } | Self::InvalidPosition(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ValidationError> for CliError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
