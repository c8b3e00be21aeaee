#![forbid(unsafe_code)]

use super::file_tags::{file_ids_with_value_tx, file_tags_delete_for_value_tx};
use super::files::delete_untagged_files_tx;
use super::implications::implications_delete_for_value_tx;
use super::support::read_value;
use super::*;
use rusqlite::{OptionalExtension, params};
use tracing::{debug, warn};
use tv_core::entities::Value;
use tv_core::ids::ValueId;
use tv_core::names::validate_name;

pub(in crate::store) fn value_by_name_tx(
    tx: &Transaction<'_>,
    name: &str,
) -> Result<Option<Value>, StoreError> {
    Ok(tx
        .query_row(
            "SELECT id, name FROM value WHERE name = ?1",
            params![name],
            read_value,
        )
        .optional()?)
}

impl StoreTx<'_> {
    pub fn value_count(&self) -> Result<u64, StoreError> {
        Ok(self
            .tx
            .query_row("SELECT count(1) FROM value", params![], |row| row.get(0))?)
    }

    pub fn values(&self) -> Result<Vec<Value>, StoreError> {
        let mut stmt = self.tx.prepare("SELECT id, name FROM value ORDER BY name")?;
        let rows = stmt.query_map(params![], read_value)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn value(&self, id: ValueId) -> Result<Option<Value>, StoreError> {
        Ok(self
            .tx
            .query_row(
                "SELECT id, name FROM value WHERE id = ?1",
                params![id.get()],
                read_value,
            )
            .optional()?)
    }

    pub fn value_by_name(&self, name: &str) -> Result<Option<Value>, StoreError> {
        value_by_name_tx(&self.tx, name)
    }

    pub fn add_value(&self, name: &str) -> Result<Value, StoreError> {
        validate_name(name).map_err(|err| StoreError::InvalidInput(err.message()))?;
        if value_by_name_tx(&self.tx, name)?.is_some() {
            return Err(StoreError::ValueAlreadyExists(name.to_string()));
        }

        self.tx
            .execute("INSERT INTO value(name) VALUES (?1)", params![name])?;
        Ok(Value {
            id: ValueId::new(self.tx.last_insert_rowid()),
            name: name.to_string(),
        })
    }

    pub fn rename_value(&self, id: ValueId, new_name: &str) -> Result<Value, StoreError> {
        validate_name(new_name).map_err(|err| StoreError::InvalidInput(err.message()))?;
        if let Some(existing) = value_by_name_tx(&self.tx, new_name)? {
            if existing.id == id {
                return Ok(existing);
            }
            return Err(StoreError::ValueAlreadyExists(new_name.to_string()));
        }

        let affected = self.tx.execute(
            "UPDATE value SET name = ?2 WHERE id = ?1",
            params![id.get(), new_name],
        )?;
        if affected == 0 {
            return Err(StoreError::UnknownId);
        }
        Ok(Value {
            id,
            name: new_name.to_string(),
        })
    }

    /// Deletes a value, every file tagging that uses it and every implication mentioning it.
    /// Files left without any tag are removed.
    pub fn delete_value(&self, id: ValueId) -> Result<(), StoreError> {
        let file_ids = file_ids_with_value_tx(&self.tx, id)?;
        file_tags_delete_for_value_tx(&self.tx, id)?;
        let implications = implications_delete_for_value_tx(&self.tx, id)?;

        let affected = self
            .tx
            .execute("DELETE FROM value WHERE id = ?1", params![id.get()])?;
        if affected == 0 {
            return Err(StoreError::UnknownId);
        }

        let removed = delete_untagged_files_tx(&self.tx, &file_ids)?;
        if removed > 0 {
            warn!(value = %id, files = removed, "deleting value removed files left untagged");
        }
        debug!(value = %id, implications, "value deleted");
        Ok(())
    }
}
