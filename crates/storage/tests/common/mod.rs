#![forbid(unsafe_code)]
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tv_core::entities::{FileStat, Fingerprint, TagValuePair};
use tv_core::ids::FileId;
use tv_storage::{SqliteStore, StoreConfig, StoreTx};

/// A store in a fresh temporary directory; the directory doubles as the root.
pub struct TestStore {
    pub store: SqliteStore,
    pub dir: TempDir,
}

impl TestStore {
    pub fn open() -> Self {
        init_tracing();
        let dir = tempfile::tempdir().expect("create temp dir");
        let config = StoreConfig::for_database(dir.path().join(".tagvault").join("db"));
        let store = SqliteStore::open(&config).expect("open store");
        Self { store, dir }
    }

    pub fn root(&self) -> &str {
        self.store.root_path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        Path::new(self.store.root_path()).join(rel)
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn stat(fingerprint: &str, mod_time_ms: i64, size: i64) -> FileStat {
    FileStat {
        fingerprint: Fingerprint::new(fingerprint),
        mod_time_ms,
        size,
        is_dir: false,
    }
}

/// Ensures the tag (and value, when given) exist and returns their pair.
pub fn pair(tx: &StoreTx<'_>, tag: &str, value: Option<&str>) -> TagValuePair {
    let tag = match tx.tag_by_name(tag).expect("lookup tag") {
        Some(tag) => tag,
        None => tx.add_tag(tag).expect("add tag"),
    };
    let value_id = value.map(|value| {
        match tx.value_by_name(value).expect("lookup value") {
            Some(value) => value,
            None => tx.add_value(value).expect("add value"),
        }
        .id
    });
    TagValuePair::new(tag.id, value_id)
}

/// Adds a file under the root and applies each `tag` or `tag=value`.
pub fn tagged_file(tx: &StoreTx<'_>, rel: &str, size: i64, tags: &[&str]) -> FileId {
    let path = Path::new(tx.root_path()).join(rel);
    let file = tx
        .add_file(&path, &stat(&format!("fp-{rel}"), size * 1_000, size))
        .expect("add file");
    for spec in tags {
        let (tag, value) = match spec.split_once('=') {
            Some((tag, value)) => (tag, Some(value)),
            None => (*spec, None),
        };
        let pair = pair(tx, tag, value);
        tx.add_file_tag(file.id, pair).expect("tag file");
    }
    file.id
}

pub fn names(files: &[tv_core::entities::File]) -> Vec<String> {
    files.iter().map(|file| file.name.clone()).collect()
}
