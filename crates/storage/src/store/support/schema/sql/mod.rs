#![forbid(unsafe_code)]

mod core;
mod files;
mod implications;
mod indexes;
mod tags;

pub(super) fn full_schema_sql() -> String {
    let mut sql = String::new();
    sql.push_str(core::SQL);
    sql.push_str(tags::SQL);
    sql.push_str(files::SQL);
    sql.push_str(implications::SQL);
    sql.push_str(indexes::SQL);
    sql
}
