#![forbid(unsafe_code)]

use super::support::{IMPLICATION_ORDER, IMPLICATION_SELECT, expect_single_row, read_implication};
use super::tags::ensure_pair_exists_tx;
use super::*;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter};
use tracing::debug;
use tv_core::entities::{Implication, TagValuePair};
use tv_core::ids::{TagId, ValueId};

pub(in crate::store) fn implications_list_tx(
    tx: &Transaction<'_>,
) -> Result<Vec<Implication>, StoreError> {
    let sql = format!("{IMPLICATION_SELECT}{IMPLICATION_ORDER}");
    let mut stmt = tx.prepare(&sql)?;
    let rows = stmt.query_map(params![], read_implication)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Implications whose implying side equals any of `pairs`.
pub(in crate::store) fn implications_for_tx(
    tx: &Transaction<'_>,
    pairs: &[TagValuePair],
) -> Result<Vec<Implication>, StoreError> {
    if pairs.is_empty() {
        return Ok(Vec::new());
    }

    let mut sql = String::from(IMPLICATION_SELECT);
    sql.push_str(" WHERE ");
    let mut values: Vec<SqlValue> = Vec::with_capacity(pairs.len() * 2);
    for (index, pair) in pairs.iter().enumerate() {
        if index > 0 {
            sql.push_str(" OR ");
        }
        sql.push_str("(implication.tag_id = ? AND implication.value_id = ?)");
        values.push(SqlValue::Integer(pair.tag_id.get()));
        values.push(SqlValue::Integer(ValueId::to_row(pair.value_id)));
    }
    sql.push_str(IMPLICATION_ORDER);

    let mut stmt = tx.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), read_implication)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub(in crate::store) fn implication_add_tx(
    tx: &Transaction<'_>,
    pair: TagValuePair,
    implied: TagValuePair,
) -> Result<(), StoreError> {
    ensure_pair_exists_tx(tx, pair)?;
    ensure_pair_exists_tx(tx, implied)?;
    tx.execute(
        "INSERT OR IGNORE INTO implication(tag_id, value_id, implied_tag_id, implied_value_id) \
         VALUES (?1, ?2, ?3, ?4)",
        params![
            pair.tag_id.get(),
            ValueId::to_row(pair.value_id),
            implied.tag_id.get(),
            ValueId::to_row(implied.value_id),
        ],
    )?;
    Ok(())
}

pub(in crate::store) fn implication_delete_tx(
    tx: &Transaction<'_>,
    pair: TagValuePair,
    implied: TagValuePair,
) -> Result<(), StoreError> {
    let affected = tx.execute(
        "DELETE FROM implication \
         WHERE tag_id = ?1 AND value_id = ?2 AND implied_tag_id = ?3 AND implied_value_id = ?4",
        params![
            pair.tag_id.get(),
            ValueId::to_row(pair.value_id),
            implied.tag_id.get(),
            ValueId::to_row(implied.value_id),
        ],
    )?;
    expect_single_row(affected, || StoreError::NoSuchImplication {
        implying: pair,
        implied,
    })
}

pub(in crate::store) fn implications_delete_for_tag_tx(
    tx: &Transaction<'_>,
    tag_id: TagId,
) -> Result<usize, StoreError> {
    Ok(tx.execute(
        "DELETE FROM implication WHERE tag_id = ?1 OR implied_tag_id = ?1",
        params![tag_id.get()],
    )?)
}

pub(in crate::store) fn implications_delete_for_value_tx(
    tx: &Transaction<'_>,
    value_id: ValueId,
) -> Result<usize, StoreError> {
    Ok(tx.execute(
        "DELETE FROM implication WHERE value_id = ?1 OR implied_value_id = ?1",
        params![value_id.get()],
    )?)
}

impl StoreTx<'_> {
    /// Every implication, ordered by implying tag, implying value, implied tag, implied value.
    pub fn implications(&self) -> Result<Vec<Implication>, StoreError> {
        implications_list_tx(&self.tx)
    }

    /// Implications whose implying side matches any of `pairs`, in the same order as
    /// [`StoreTx::implications`].
    pub fn implications_for(&self, pairs: &[TagValuePair]) -> Result<Vec<Implication>, StoreError> {
        implications_for_tx(&self.tx, pairs)
    }

    /// Adds `pair => implied`. Adding an existing implication again is a no-op; a side naming
    /// an unknown tag or value fails with [`StoreError::UnknownId`].
    pub fn add_implication(
        &self,
        pair: TagValuePair,
        implied: TagValuePair,
    ) -> Result<(), StoreError> {
        implication_add_tx(&self.tx, pair, implied)?;
        debug!(%pair, %implied, "implication added");
        Ok(())
    }

    /// Removes exactly `pair => implied`, failing with [`StoreError::NoSuchImplication`]
    /// when it does not exist.
    pub fn delete_implication(
        &self,
        pair: TagValuePair,
        implied: TagValuePair,
    ) -> Result<(), StoreError> {
        implication_delete_tx(&self.tx, pair, implied)?;
        debug!(%pair, %implied, "implication deleted");
        Ok(())
    }

    /// Removes every implication mentioning `tag_id` on either side.
    pub fn delete_implications_for_tag(&self, tag_id: TagId) -> Result<usize, StoreError> {
        implications_delete_for_tag_tx(&self.tx, tag_id)
    }

    /// Removes every implication mentioning `value_id` on either side.
    pub fn delete_implications_for_value(&self, value_id: ValueId) -> Result<usize, StoreError> {
        implications_delete_for_value_tx(&self.tx, value_id)
    }
}
