#![forbid(unsafe_code)]

mod config;
mod error;
mod file_tags;
mod files;
mod implications;
mod query;
mod support;
mod tags;
mod values;

pub use config::{DB_ENV, ROOT_ENV, StoreConfig};
pub use error::{StoreError, StoreResultExt};
pub use files::FileSort;

use rusqlite::{Connection, Transaction};
use std::path::{Path, PathBuf};
use std::time::Duration;
use support::migrate_sqlite_schema;
use tracing::info;
use tv_core::entities::File;
use tv_core::paths;

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    db_path: PathBuf,
    root_path: String,
}

impl SqliteStore {
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let db_path = config.db_path.clone();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;
        let root_path = resolve_root(&config.root_path)?;
        let store = Self::from_connection(conn, db_path, root_path, config.busy_timeout_ms)?;
        info!(
            db = %store.db_path.display(),
            root = %store.root_path,
            "store opened"
        );
        Ok(store)
    }

    /// A throwaway store, mainly for tests and dry runs.
    pub fn open_in_memory(root_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let root_path = resolve_root(root_path.as_ref())?;
        Self::from_connection(conn, PathBuf::from(":memory:"), root_path, 0)
    }

    fn from_connection(
        conn: Connection,
        db_path: PathBuf,
        root_path: String,
        busy_timeout_ms: u64,
    ) -> Result<Self, StoreError> {
        conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
        migrate_sqlite_schema(&conn)?;
        Ok(Self {
            conn,
            db_path,
            root_path,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    /// Starts a transaction. Every store operation runs through the returned handle; it is
    /// rolled back unless [`StoreTx::commit`] is called.
    pub fn transaction(&mut self) -> Result<StoreTx<'_>, StoreError> {
        let tx = self.conn.transaction()?;
        Ok(StoreTx {
            tx,
            root_path: &self.root_path,
        })
    }
}

fn resolve_root(root_path: &Path) -> Result<String, StoreError> {
    let absolute = std::path::absolute(root_path)?;
    let Some(raw) = absolute.to_str() else {
        return Err(StoreError::InvalidInput("root path must be valid UTF-8"));
    };
    Ok(paths::clean(raw))
}

/// An open transaction plus the root that tracked paths are stored relative to.
#[derive(Debug)]
pub struct StoreTx<'s> {
    tx: Transaction<'s>,
    root_path: &'s str,
}

impl StoreTx<'_> {
    pub fn commit(self) -> Result<(), StoreError> {
        self.tx.commit()?;
        Ok(())
    }

    pub fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback()?;
        Ok(())
    }

    pub fn root_path(&self) -> &str {
        self.root_path
    }

    fn rel_path(&self, path: &Path) -> Result<String, StoreError> {
        Ok(paths::rel_to(path_str(path)?, self.root_path))
    }

    fn abs_file(&self, mut file: File) -> File {
        file.directory = paths::abs_directory(self.root_path, &file.directory);
        file
    }

    fn abs_files(&self, files: Vec<File>) -> Vec<File> {
        files.into_iter().map(|file| self.abs_file(file)).collect()
    }
}

fn path_str(path: &Path) -> Result<&str, StoreError> {
    path.to_str()
        .ok_or(StoreError::InvalidInput("path must be valid UTF-8"))
}
