#![forbid(unsafe_code)]

use super::file_tags::file_tags_delete_for_file_tx;
use super::support::{FILE_COLUMNS, descendants_pattern, read_file};
use super::*;
use rusqlite::{OptionalExtension, params};
use std::str::FromStr;
use tracing::debug;
use tv_core::entities::{File, FileStat, Fingerprint};
use tv_core::ids::FileId;

/// Ordering for file listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FileSort {
    Id,
    #[default]
    Name,
    Time,
    Size,
    /// Whatever order SQLite produces.
    None,
}

impl FileSort {
    pub(in crate::store) fn order_by(self) -> &'static str {
        match self {
            Self::Id => " ORDER BY id",
            Self::Name => " ORDER BY directory || '/' || name",
            Self::Time => " ORDER BY mod_time, directory || '/' || name",
            Self::Size => " ORDER BY size, directory || '/' || name",
            Self::None => "",
        }
    }
}

impl FromStr for FileSort {
    type Err = StoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "time" => Ok(Self::Time),
            "size" => Ok(Self::Size),
            "none" => Ok(Self::None),
            _ => Err(StoreError::InvalidInput(
                "sort must be one of: id, name, time, size, none",
            )),
        }
    }
}

pub(in crate::store) fn delete_file_if_untagged_tx(
    tx: &Transaction<'_>,
    file_id: FileId,
) -> Result<bool, StoreError> {
    let affected = tx.execute(
        "DELETE FROM file WHERE id = ?1 AND id NOT IN (SELECT file_id FROM file_tag)",
        params![file_id.get()],
    )?;
    Ok(affected > 0)
}

pub(in crate::store) fn delete_untagged_files_tx(
    tx: &Transaction<'_>,
    file_ids: &[FileId],
) -> Result<usize, StoreError> {
    let mut stmt = tx.prepare_cached(
        "DELETE FROM file WHERE id = ?1 AND id NOT IN (SELECT file_id FROM file_tag)",
    )?;
    let mut removed = 0usize;
    for file_id in file_ids {
        removed += stmt.execute(params![file_id.get()])?;
    }
    Ok(removed)
}

impl StoreTx<'_> {
    fn select_files(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<File>, StoreError> {
        let mut stmt = self.tx.prepare(sql)?;
        let rows = stmt.query_map(params, read_file)?;
        let files = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(self.abs_files(files))
    }

    pub fn file_count(&self) -> Result<u64, StoreError> {
        Ok(self
            .tx
            .query_row("SELECT count(1) FROM file", params![], |row| row.get(0))?)
    }

    pub fn files(&self, sort: FileSort) -> Result<Vec<File>, StoreError> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM file{}", sort.order_by());
        self.select_files(&sql, params![])
    }

    pub fn file(&self, id: FileId) -> Result<Option<File>, StoreError> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM file WHERE id = ?1");
        let file = self
            .tx
            .query_row(&sql, params![id.get()], read_file)
            .optional()?;
        Ok(file.map(|file| self.abs_file(file)))
    }

    pub fn file_by_path(&self, path: impl AsRef<Path>) -> Result<Option<File>, StoreError> {
        let rel = self.rel_path(path.as_ref())?;
        let (directory, name) = paths::split_dir_name(&rel);
        let sql = format!("SELECT {FILE_COLUMNS} FROM file WHERE directory = ?1 AND name = ?2");
        let file = self
            .tx
            .query_row(&sql, params![directory, name], read_file)
            .optional()?;
        Ok(file.map(|file| self.abs_file(file)))
    }

    /// Files anywhere beneath `path`, ordered by path.
    pub fn files_by_directory(&self, path: impl AsRef<Path>) -> Result<Vec<File>, StoreError> {
        let rel = self.rel_path(path.as_ref())?;
        if rel == "." {
            let sql = format!(
                "SELECT {FILE_COLUMNS} FROM file WHERE directory NOT LIKE '/%'{}",
                FileSort::Name.order_by()
            );
            return self.select_files(&sql, params![]);
        }

        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM file \
             WHERE directory = ?1 OR directory LIKE ?2 ESCAPE '\\'{}",
            FileSort::Name.order_by()
        );
        self.select_files(&sql, params![rel, descendants_pattern(&rel)])
    }

    pub fn files_by_directories<P: AsRef<Path>>(&self, dirs: &[P]) -> Result<Vec<File>, StoreError> {
        let mut out = Vec::new();
        for dir in dirs {
            let dir = dir.as_ref();
            let files = self.files_by_directory(dir).context_with(|| {
                format!("'{}': could not retrieve files for directory", dir.display())
            })?;
            out.extend(files);
        }
        Ok(out)
    }

    pub fn file_count_by_fingerprint(&self, fingerprint: &Fingerprint) -> Result<u64, StoreError> {
        Ok(self.tx.query_row(
            "SELECT count(id) FROM file WHERE fingerprint = ?1",
            params![fingerprint.as_str()],
            |row| row.get(0),
        )?)
    }

    pub fn files_by_fingerprint(&self, fingerprint: &Fingerprint) -> Result<Vec<File>, StoreError> {
        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM file WHERE fingerprint = ?1{}",
            FileSort::Name.order_by()
        );
        self.select_files(&sql, params![fingerprint.as_str()])
    }

    /// Files with no tag applied directly.
    pub fn untagged_files(&self) -> Result<Vec<File>, StoreError> {
        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM file WHERE id NOT IN (SELECT DISTINCT file_id FROM file_tag){}",
            FileSort::Name.order_by()
        );
        self.select_files(&sql, params![])
    }

    /// Groups of files sharing a non-empty fingerprint, each group ordered by path.
    pub fn duplicate_files(&self) -> Result<Vec<Vec<File>>, StoreError> {
        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM file \
             WHERE fingerprint IN ( \
                 SELECT fingerprint FROM file WHERE fingerprint != '' \
                 GROUP BY fingerprint HAVING count(1) > 1) \
             ORDER BY fingerprint, directory || '/' || name"
        );
        let files = self.select_files(&sql, params![])?;

        let mut groups: Vec<Vec<File>> = Vec::new();
        for file in files {
            match groups.last_mut() {
                Some(group) if group[0].fingerprint == file.fingerprint => group.push(file),
                _ => groups.push(vec![file]),
            }
        }
        Ok(groups)
    }

    pub fn add_file(&self, path: impl AsRef<Path>, stat: &FileStat) -> Result<File, StoreError> {
        let rel = self.rel_path(path.as_ref())?;
        if rel.is_empty() {
            return Err(StoreError::InvalidInput("file path must not be empty"));
        }
        let (directory, name) = paths::split_dir_name(&rel);

        self.tx.execute(
            "INSERT INTO file(directory, name, fingerprint, mod_time, size, is_dir) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                directory,
                name,
                stat.fingerprint.as_str(),
                stat.mod_time_ms,
                stat.size,
                stat.is_dir
            ],
        )?;
        let file = File {
            id: FileId::new(self.tx.last_insert_rowid()),
            directory,
            name,
            fingerprint: stat.fingerprint.clone(),
            mod_time_ms: stat.mod_time_ms,
            size: stat.size,
            is_dir: stat.is_dir,
        };
        debug!(file = %file.id, path = %rel, "file added");
        Ok(self.abs_file(file))
    }

    pub fn update_file(
        &self,
        id: FileId,
        path: impl AsRef<Path>,
        stat: &FileStat,
    ) -> Result<File, StoreError> {
        let rel = self.rel_path(path.as_ref())?;
        let (directory, name) = paths::split_dir_name(&rel);

        let affected = self.tx.execute(
            "UPDATE file \
             SET directory = ?2, name = ?3, fingerprint = ?4, mod_time = ?5, size = ?6, is_dir = ?7 \
             WHERE id = ?1",
            params![
                id.get(),
                directory,
                name,
                stat.fingerprint.as_str(),
                stat.mod_time_ms,
                stat.size,
                stat.is_dir
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::UnknownId);
        }
        Ok(self.abs_file(File {
            id,
            directory,
            name,
            fingerprint: stat.fingerprint.clone(),
            mod_time_ms: stat.mod_time_ms,
            size: stat.size,
            is_dir: stat.is_dir,
        }))
    }

    /// Deletes a file and every tag applied to it.
    pub fn delete_file(&self, id: FileId) -> Result<(), StoreError> {
        file_tags_delete_for_file_tx(&self.tx, id)?;
        let affected = self
            .tx
            .execute("DELETE FROM file WHERE id = ?1", params![id.get()])?;
        if affected == 0 {
            return Err(StoreError::UnknownId);
        }
        Ok(())
    }

    /// Deletes the file only if it carries no tags. Returns whether it was deleted.
    pub fn delete_file_if_untagged(&self, id: FileId) -> Result<bool, StoreError> {
        delete_file_if_untagged_tx(&self.tx, id)
    }

    pub fn delete_untagged_files(&self, ids: &[FileId]) -> Result<usize, StoreError> {
        delete_untagged_files_tx(&self.tx, ids)
    }
}
