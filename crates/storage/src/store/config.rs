#![forbid(unsafe_code)]

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DB_ENV: &str = "TAGVAULT_DB";
pub const ROOT_ENV: &str = "TAGVAULT_ROOT";

const DEFAULT_DB_DIR: &str = ".tagvault";
const DEFAULT_DB_FILE: &str = "db";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Where the database lives and which directory tracked paths are stored relative to.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub root_path: PathBuf,
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::for_database(Path::new(DEFAULT_DB_DIR).join(DEFAULT_DB_FILE))
    }
}

impl StoreConfig {
    /// A database at `<root>/.tagvault/db` tracks `<root>`: the root is the parent of the
    /// directory holding the database file.
    pub fn for_database(db_path: impl Into<PathBuf>) -> Self {
        let db_path = db_path.into();
        let root_path = db_path
            .parent()
            .and_then(Path::parent)
            .filter(|root| !root.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            db_path,
            root_path,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    pub fn with_root(mut self, root_path: impl Into<PathBuf>) -> Self {
        self.root_path = root_path.into();
        self
    }

    /// Reads `TAGVAULT_DB` and `TAGVAULT_ROOT`, falling back to `./.tagvault/db`.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var_os(DB_ENV).map(PathBuf::from),
            std::env::var_os(ROOT_ENV).map(PathBuf::from),
        )
    }

    fn from_vars(db_path: Option<PathBuf>, root_path: Option<PathBuf>) -> Self {
        let config = match db_path {
            Some(db_path) => Self::for_database(db_path),
            None => Self::default(),
        };
        match root_path {
            Some(root_path) => config.with_root(root_path),
            None => config,
        }
    }
}
