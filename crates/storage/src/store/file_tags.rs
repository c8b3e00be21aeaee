#![forbid(unsafe_code)]

use super::files::delete_file_if_untagged_tx;
use super::implications::implications_for_tx;
use super::support::{expect_single_row, read_file_tag};
use super::tags::ensure_pair_exists_tx;
use super::*;
use rusqlite::{OptionalExtension, params};
use std::collections::{HashMap, HashSet};
use tracing::debug;
use tv_core::entities::{FileTag, TagValuePair};
use tv_core::ids::{FileId, TagId, ValueId};

fn file_ids_tx(
    tx: &Transaction<'_>,
    sql: &str,
    id: i64,
) -> Result<Vec<FileId>, StoreError> {
    let mut stmt = tx.prepare(sql)?;
    let rows = stmt.query_map(params![id], |row| Ok(FileId::new(row.get(0)?)))?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub(in crate::store) fn file_ids_with_tag_tx(
    tx: &Transaction<'_>,
    tag_id: TagId,
) -> Result<Vec<FileId>, StoreError> {
    file_ids_tx(
        tx,
        "SELECT DISTINCT file_id FROM file_tag WHERE tag_id = ?1 ORDER BY file_id",
        tag_id.get(),
    )
}

pub(in crate::store) fn file_ids_with_value_tx(
    tx: &Transaction<'_>,
    value_id: ValueId,
) -> Result<Vec<FileId>, StoreError> {
    file_ids_tx(
        tx,
        "SELECT DISTINCT file_id FROM file_tag WHERE value_id = ?1 ORDER BY file_id",
        value_id.get(),
    )
}

pub(in crate::store) fn file_tags_delete_for_tag_tx(
    tx: &Transaction<'_>,
    tag_id: TagId,
) -> Result<usize, StoreError> {
    Ok(tx.execute(
        "DELETE FROM file_tag WHERE tag_id = ?1",
        params![tag_id.get()],
    )?)
}

pub(in crate::store) fn file_tags_delete_for_value_tx(
    tx: &Transaction<'_>,
    value_id: ValueId,
) -> Result<usize, StoreError> {
    Ok(tx.execute(
        "DELETE FROM file_tag WHERE value_id = ?1",
        params![value_id.get()],
    )?)
}

pub(in crate::store) fn file_tags_delete_for_file_tx(
    tx: &Transaction<'_>,
    file_id: FileId,
) -> Result<usize, StoreError> {
    Ok(tx.execute(
        "DELETE FROM file_tag WHERE file_id = ?1",
        params![file_id.get()],
    )?)
}

pub(in crate::store) fn file_tag_count_tx(
    tx: &Transaction<'_>,
    file_id: FileId,
) -> Result<u64, StoreError> {
    Ok(tx.query_row(
        "SELECT count(1) FROM file_tag WHERE file_id = ?1",
        params![file_id.get()],
        |row| row.get(0),
    )?)
}

fn explicit_file_tags_tx(
    tx: &Transaction<'_>,
    file_id: FileId,
) -> Result<Vec<FileTag>, StoreError> {
    let mut stmt = tx.prepare(
        "SELECT file_tag.file_id, file_tag.tag_id, file_tag.value_id \
         FROM file_tag \
         INNER JOIN tag ON file_tag.tag_id = tag.id \
         LEFT OUTER JOIN value ON file_tag.value_id = value.id \
         WHERE file_tag.file_id = ?1 \
         ORDER BY tag.name, value.name",
    )?;
    let rows = stmt.query_map(params![file_id.get()], read_file_tag)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Pairs whose implications apply to a file carrying `pairs`: each pair itself and, for a
/// valued pair, its bare tag (a file tagged `rating=5` also carries `rating`).
fn implying_lookup(pairs: &[TagValuePair]) -> Vec<TagValuePair> {
    let mut seen = HashSet::with_capacity(pairs.len() * 2);
    let mut out = Vec::with_capacity(pairs.len() * 2);
    for &pair in pairs {
        for candidate in [pair, TagValuePair::tag(pair.tag_id)] {
            if seen.insert(candidate) {
                out.push(candidate);
            }
        }
    }
    out
}

/// Follows implications forward from the explicit tags until no new pair appears.
fn with_implied_file_tags_tx(
    tx: &Transaction<'_>,
    file_id: FileId,
    explicit: Vec<FileTag>,
) -> Result<Vec<FileTag>, StoreError> {
    let mut out = explicit;
    let mut known: HashMap<TagValuePair, usize> = out
        .iter()
        .enumerate()
        .map(|(index, file_tag)| (file_tag.pair(), index))
        .collect();
    let mut frontier: Vec<TagValuePair> = out.iter().map(FileTag::pair).collect();
    let mut looked_up: HashSet<TagValuePair> = HashSet::new();

    while !frontier.is_empty() {
        let lookup: Vec<TagValuePair> = implying_lookup(&frontier)
            .into_iter()
            .filter(|pair| looked_up.insert(*pair))
            .collect();
        frontier.clear();
        for implication in implications_for_tx(tx, &lookup)? {
            let pair = implication.implied_pair();
            match known.get(&pair) {
                Some(&index) => out[index].implicit = true,
                None => {
                    known.insert(pair, out.len());
                    out.push(FileTag {
                        file_id,
                        tag_id: pair.tag_id,
                        value_id: pair.value_id,
                        explicit: false,
                        implicit: true,
                    });
                    frontier.push(pair);
                }
            }
        }
    }
    Ok(out)
}

impl StoreTx<'_> {
    /// Tags applied to a file. Unless `explicit_only`, tags reached through implications are
    /// included and flagged `implicit`.
    pub fn file_tags(&self, file_id: FileId, explicit_only: bool) -> Result<Vec<FileTag>, StoreError> {
        let explicit = explicit_file_tags_tx(&self.tx, file_id)?;
        if explicit_only {
            return Ok(explicit);
        }
        with_implied_file_tags_tx(&self.tx, file_id, explicit)
    }

    /// Number of tags applied directly to a file.
    pub fn file_tag_count(&self, file_id: FileId) -> Result<u64, StoreError> {
        file_tag_count_tx(&self.tx, file_id)
    }

    /// Applies `pair` to a file. Applying an existing tagging again is a no-op.
    pub fn add_file_tag(&self, file_id: FileId, pair: TagValuePair) -> Result<FileTag, StoreError> {
        let file_exists = self
            .tx
            .query_row(
                "SELECT 1 FROM file WHERE id = ?1",
                params![file_id.get()],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !file_exists {
            return Err(StoreError::UnknownId);
        }
        ensure_pair_exists_tx(&self.tx, pair)?;

        self.tx.execute(
            "INSERT OR IGNORE INTO file_tag(file_id, tag_id, value_id) VALUES (?1, ?2, ?3)",
            params![
                file_id.get(),
                pair.tag_id.get(),
                ValueId::to_row(pair.value_id)
            ],
        )?;
        Ok(FileTag {
            file_id,
            tag_id: pair.tag_id,
            value_id: pair.value_id,
            explicit: true,
            implicit: false,
        })
    }

    /// Removes one tagging; the file itself goes too when this was its last tag.
    pub fn delete_file_tag(&self, file_id: FileId, pair: TagValuePair) -> Result<(), StoreError> {
        let affected = self.tx.execute(
            "DELETE FROM file_tag WHERE file_id = ?1 AND tag_id = ?2 AND value_id = ?3",
            params![
                file_id.get(),
                pair.tag_id.get(),
                ValueId::to_row(pair.value_id)
            ],
        )?;
        expect_single_row(affected, || StoreError::NoSuchFileTag { file_id, pair })?;

        if delete_file_if_untagged_tx(&self.tx, file_id)? {
            debug!(file = %file_id, "last tag removed; file deleted");
        }
        Ok(())
    }

    /// Removes every tagging of a file, and with it the file.
    pub fn delete_file_tags(&self, file_id: FileId) -> Result<usize, StoreError> {
        let removed = file_tags_delete_for_file_tx(&self.tx, file_id)?;
        delete_file_if_untagged_tx(&self.tx, file_id)?;
        Ok(removed)
    }
}
