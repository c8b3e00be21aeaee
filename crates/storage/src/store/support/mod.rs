#![forbid(unsafe_code)]

mod file_query;
mod rows;
mod schema;

pub(super) use file_query::*;
pub(super) use rows::*;
pub(super) use schema::migrate_sqlite_schema;

use super::StoreError;

/// Exact-match deletes must touch exactly one row; more than one means the uniqueness
/// constraint the schema relies on is broken.
pub(super) fn expect_single_row(
    affected: usize,
    not_found: impl FnOnce() -> StoreError,
) -> Result<(), StoreError> {
    match affected {
        0 => Err(not_found()),
        1 => Ok(()),
        _ => Err(StoreError::Invariant("expected exactly one row to be affected")),
    }
}

/// Escapes `%`, `_` and `\` for use in a `LIKE ... ESCAPE '\'` pattern.
pub(super) fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Pattern matching every path strictly beneath `directory`.
pub(super) fn descendants_pattern(directory: &str) -> String {
    let escaped = escape_like(directory);
    if escaped.ends_with('/') {
        format!("{escaped}%")
    } else {
        format!("{escaped}/%")
    }
}
