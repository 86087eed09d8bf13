//! `janio` command-line host for the organizer core.
//!
//! # Responsibility
//! - Build an `AppConfig` from flags and environment.
//! - Open the configured store and run one command against it.
//!
//! # Invariants
//! - Every command loads the whole catalog before acting.
//! - Notices raised during a command go to stderr; data goes to stdout.
//! - Exit code is 0 only when the command succeeded without notices.

mod commands;
mod error;

use clap::{Parser, Subcommand, ValueHint};
use error::CliError;
use janio_core::db::open_db;
use janio_core::{
    init_logging, AppConfig, CategoryId, JsonFileItemStore, SqliteItemStore, StoreBackend,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const DEFAULT_DB_FILE: &str = "janio.db";

#[derive(Debug, Parser)]
#[command(
    name = "janio",
    version,
    about = "Categorized notes and tasks from the terminal",
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        env = "JANIO_DB",
        conflicts_with = "content_dir",
        help = "SQLite database file (default: ./janio.db)",
        value_hint = ValueHint::FilePath
    )]
    db: Option<PathBuf>,
    #[arg(
        long,
        env = "JANIO_CONTENT_DIR",
        help = "Directory of <category>.json documents instead of SQLite",
        value_hint = ValueHint::DirPath
    )]
    content_dir: Option<PathBuf>,
    #[arg(
        long,
        env = "JANIO_LOG_DIR",
        help = "Write rolling logs to this directory",
        value_hint = ValueHint::DirPath
    )]
    log_dir: Option<PathBuf>,
    #[arg(long, env = "JANIO_LOG_LEVEL", help = "trace|debug|info|warn|error")]
    log_level: Option<String>,
    #[arg(long, global = true, help = "Emit JSON on stdout")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List the category catalog.
    Categories,
    /// Show items of one category, or of all categories.
    List { category: Option<CategoryId> },
    /// Create an item.
    Add {
        category: CategoryId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "due", help = "Due date (YYYY-MM-DD or RFC 3339); task categories only")]
        due: Option<String>,
        #[arg(long, help = "Explicit item id (default: generated)")]
        id: Option<String>,
    },
    /// Replace fields of an existing item.
    Edit {
        category: CategoryId,
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "due")]
        due: Option<String>,
        #[arg(long)]
        order: Option<u32>,
    },
    /// Delete an item.
    Delete { category: CategoryId, id: String },
    /// Move an item to a 1-based position.
    Move {
        category: CategoryId,
        id: String,
        position: usize,
    },
    /// Validate a raw mutation payload and apply it to the store.
    Apply {
        #[arg(help = r#"e.g. {"action":"delete","category":"notes","itemId":"..."}"#)]
        payload: String,
    },
}

impl Cli {
    fn app_config(&self) -> Result<AppConfig, CliError> {
        let store = match (&self.content_dir, &self.db) {
            (Some(dir), _) => StoreBackend::JsonFiles { dir: dir.clone() },
            (None, Some(path)) => StoreBackend::Sqlite { path: path.clone() },
            (None, None) => StoreBackend::Sqlite {
                path: PathBuf::from(DEFAULT_DB_FILE),
            },
        };
        let mut config = AppConfig::new(store);
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        config.log_dir = self.log_dir.as_deref().map(absolutize).transpose()?;
        Ok(config.validate()?)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            err.exit_code()
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let config = cli.app_config()?;
    if let Some(dir) = &config.log_dir {
        init_logging(&config.log_level, dir)?;
    }

    let json = cli.json;
    match &config.store {
        StoreBackend::Sqlite { path } => {
            let conn = open_db(path)?;
            let store = SqliteItemStore::try_new(&conn)?;
            commands::execute(store, &config, cli.command, json)
        }
        StoreBackend::JsonFiles { dir } => {
            let store = JsonFileItemStore::open(dir)?;
            commands::execute(store, &config, cli.command, json)
        }
    }
}

fn absolutize(path: &Path) -> Result<PathBuf, CliError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}
