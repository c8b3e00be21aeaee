#![forbid(unsafe_code)]

use rusqlite::Row;
use tv_core::entities::{File, FileTag, Fingerprint, Implication, Tag, Value};
use tv_core::ids::{FileId, TagId, ValueId};

pub(in crate::store) const FILE_COLUMNS: &str =
    "id, directory, name, fingerprint, mod_time, size, is_dir";

pub(in crate::store) const IMPLICATION_SELECT: &str = "SELECT tag.id, tag.name, \
     value.id, value.name, \
     implied_tag.id, implied_tag.name, \
     implied_value.id, implied_value.name \
     FROM implication \
     INNER JOIN tag tag ON implication.tag_id = tag.id \
     LEFT OUTER JOIN value value ON implication.value_id = value.id \
     INNER JOIN tag implied_tag ON implication.implied_tag_id = implied_tag.id \
     LEFT OUTER JOIN value implied_value ON implication.implied_value_id = implied_value.id";

pub(in crate::store) const IMPLICATION_ORDER: &str =
    " ORDER BY tag.name, value.name, implied_tag.name, implied_value.name";

pub(in crate::store) fn read_file(row: &Row<'_>) -> rusqlite::Result<File> {
    Ok(File {
        id: FileId::new(row.get(0)?),
        directory: row.get(1)?,
        name: row.get(2)?,
        fingerprint: Fingerprint::new(row.get::<_, String>(3)?),
        mod_time_ms: row.get(4)?,
        size: row.get(5)?,
        is_dir: row.get(6)?,
    })
}

pub(in crate::store) fn read_tag(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: TagId::new(row.get(0)?),
        name: row.get(1)?,
    })
}

pub(in crate::store) fn read_value(row: &Row<'_>) -> rusqlite::Result<Value> {
    Ok(Value {
        id: ValueId::new(row.get(0)?),
        name: row.get(1)?,
    })
}

pub(in crate::store) fn read_file_tag(row: &Row<'_>) -> rusqlite::Result<FileTag> {
    Ok(FileTag {
        file_id: FileId::new(row.get(0)?),
        tag_id: TagId::new(row.get(1)?),
        value_id: ValueId::from_row(row.get(2)?),
        explicit: true,
        implicit: false,
    })
}

pub(in crate::store) fn read_implication(row: &Row<'_>) -> rusqlite::Result<Implication> {
    Ok(Implication {
        implying_tag: Tag {
            id: TagId::new(row.get(0)?),
            name: row.get(1)?,
        },
        implying_value: optional_value(row.get(2)?, row.get(3)?),
        implied_tag: Tag {
            id: TagId::new(row.get(4)?),
            name: row.get(5)?,
        },
        implied_value: optional_value(row.get(6)?, row.get(7)?),
    })
}

fn optional_value(id: Option<i64>, name: Option<String>) -> Option<Value> {
    match (ValueId::from_row(id), name) {
        (Some(id), Some(name)) => Some(Value { id, name }),
        _ => None,
    }
}
