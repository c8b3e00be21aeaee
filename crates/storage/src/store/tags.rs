#![forbid(unsafe_code)]

use super::file_tags::{file_ids_with_tag_tx, file_tags_delete_for_tag_tx};
use super::files::delete_untagged_files_tx;
use super::implications::implications_delete_for_tag_tx;
use super::support::read_tag;
use super::*;
use rusqlite::{OptionalExtension, params};
use tracing::{debug, warn};
use tv_core::entities::{Tag, TagValuePair};
use tv_core::ids::TagId;
use tv_core::names::validate_name;

pub(in crate::store) fn tag_by_name_tx(
    tx: &Transaction<'_>,
    name: &str,
) -> Result<Option<Tag>, StoreError> {
    Ok(tx
        .query_row(
            "SELECT id, name FROM tag WHERE name = ?1",
            params![name],
            read_tag,
        )
        .optional()?)
}

/// Fails with [`StoreError::UnknownId`] unless the pair's tag (and value, if any) exist.
pub(in crate::store) fn ensure_pair_exists_tx(
    tx: &Transaction<'_>,
    pair: TagValuePair,
) -> Result<(), StoreError> {
    let tag_exists = tx
        .query_row(
            "SELECT 1 FROM tag WHERE id = ?1",
            params![pair.tag_id.get()],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    let value_exists = match pair.value_id {
        None => true,
        Some(value_id) => tx
            .query_row(
                "SELECT 1 FROM value WHERE id = ?1",
                params![value_id.get()],
                |_| Ok(()),
            )
            .optional()?
            .is_some(),
    };
    if tag_exists && value_exists {
        Ok(())
    } else {
        Err(StoreError::UnknownId)
    }
}

fn checked_name(name: &str) -> Result<&str, StoreError> {
    validate_name(name).map_err(|err| StoreError::InvalidInput(err.message()))?;
    Ok(name)
}

impl StoreTx<'_> {
    pub fn tag_count(&self) -> Result<u64, StoreError> {
        Ok(self
            .tx
            .query_row("SELECT count(1) FROM tag", params![], |row| row.get(0))?)
    }

    /// All tags ordered by name.
    pub fn tags(&self) -> Result<Vec<Tag>, StoreError> {
        let mut stmt = self.tx.prepare("SELECT id, name FROM tag ORDER BY name")?;
        let rows = stmt.query_map(params![], read_tag)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn tag(&self, id: TagId) -> Result<Option<Tag>, StoreError> {
        Ok(self
            .tx
            .query_row(
                "SELECT id, name FROM tag WHERE id = ?1",
                params![id.get()],
                read_tag,
            )
            .optional()?)
    }

    pub fn tag_by_name(&self, name: &str) -> Result<Option<Tag>, StoreError> {
        tag_by_name_tx(&self.tx, name)
    }

    /// Tags for the names that exist, ordered by name; unknown names are skipped.
    pub fn tags_by_names(&self, names: &[&str]) -> Result<Vec<Tag>, StoreError> {
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            if let Some(tag) = tag_by_name_tx(&self.tx, name)? {
                if !out.contains(&tag) {
                    out.push(tag);
                }
            }
        }
        out.sort_by(|a: &Tag, b: &Tag| a.name.cmp(&b.name));
        Ok(out)
    }

    pub fn add_tag(&self, name: &str) -> Result<Tag, StoreError> {
        let name = checked_name(name)?;
        if tag_by_name_tx(&self.tx, name)?.is_some() {
            return Err(StoreError::TagAlreadyExists(name.to_string()));
        }

        self.tx
            .execute("INSERT INTO tag(name) VALUES (?1)", params![name])?;
        let tag = Tag {
            id: TagId::new(self.tx.last_insert_rowid()),
            name: name.to_string(),
        };
        debug!(tag = %tag.name, id = %tag.id, "tag added");
        Ok(tag)
    }

    pub fn rename_tag(&self, id: TagId, new_name: &str) -> Result<Tag, StoreError> {
        let new_name = checked_name(new_name)?;
        if let Some(existing) = tag_by_name_tx(&self.tx, new_name)? {
            if existing.id == id {
                return Ok(existing);
            }
            return Err(StoreError::TagAlreadyExists(new_name.to_string()));
        }

        let affected = self.tx.execute(
            "UPDATE tag SET name = ?2 WHERE id = ?1",
            params![id.get(), new_name],
        )?;
        if affected == 0 {
            return Err(StoreError::UnknownId);
        }
        Ok(Tag {
            id,
            name: new_name.to_string(),
        })
    }

    /// Deletes a tag together with its file taggings and every implication mentioning it.
    /// Files left without any tag are removed.
    pub fn delete_tag(&self, id: TagId) -> Result<(), StoreError> {
        let file_ids = file_ids_with_tag_tx(&self.tx, id)?;
        file_tags_delete_for_tag_tx(&self.tx, id)?;
        let implications = implications_delete_for_tag_tx(&self.tx, id)?;

        let affected = self
            .tx
            .execute("DELETE FROM tag WHERE id = ?1", params![id.get()])?;
        if affected == 0 {
            return Err(StoreError::UnknownId);
        }

        let removed = delete_untagged_files_tx(&self.tx, &file_ids)?;
        if removed > 0 {
            warn!(tag = %id, files = removed, "deleting tag removed files left untagged");
        }
        debug!(tag = %id, implications, files = file_ids.len(), "tag deleted");
        Ok(())
    }
}
