#![forbid(unsafe_code)]

use super::super::{FileSort, StoreError};
use super::FILE_COLUMNS;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Transaction, params};
use tv_core::paths;
use tv_core::query::{ComparisonOp, Expression};

const FILES_WITH_TAG: &str =
    "SELECT file_id FROM file_tag WHERE tag_id = (SELECT id FROM tag WHERE name = ?)";

#[derive(Clone, Copy, Debug)]
pub(in crate::store) enum FileSelection {
    Count,
    Rows(FileSort),
}

#[derive(Debug)]
pub(in crate::store) struct FileQuery {
    pub(in crate::store) sql: String,
    pub(in crate::store) params: Vec<SqlValue>,
}

/// Translates an expression (already expanded, if implications apply) into a query over `file`.
///
/// `scope` is a root-relative (or absolute, outside the root) path restricting matches to
/// that file or anything beneath it.
pub(in crate::store) fn build_file_query_tx(
    tx: &Transaction<'_>,
    expression: &Expression,
    scope: Option<&str>,
    selection: FileSelection,
) -> Result<FileQuery, StoreError> {
    let mut builder = FileQueryBuilder {
        tx,
        sql: String::new(),
        params: Vec::new(),
    };

    match selection {
        FileSelection::Count => builder.sql.push_str("SELECT count(1) FROM file WHERE "),
        FileSelection::Rows(_) => {
            builder.sql.push_str("SELECT ");
            builder.sql.push_str(FILE_COLUMNS);
            builder.sql.push_str(" FROM file WHERE ");
        }
    }
    builder.push_expression(expression)?;
    if let Some(scope) = scope.filter(|scope| !scope.is_empty()) {
        builder.push_scope(scope);
    }
    if let FileSelection::Rows(sort) = selection {
        builder.sql.push_str(sort.order_by());
    }

    Ok(FileQuery {
        sql: builder.sql,
        params: builder.params,
    })
}

struct FileQueryBuilder<'a, 'conn> {
    tx: &'a Transaction<'conn>,
    sql: String,
    params: Vec<SqlValue>,
}

impl FileQueryBuilder<'_, '_> {
    fn push_expression(&mut self, expression: &Expression) -> Result<(), StoreError> {
        match expression {
            Expression::Empty => self.sql.push_str("1 = 1"),
            Expression::Tag(name) => {
                self.sql.push_str("id IN (");
                self.sql.push_str(FILES_WITH_TAG);
                self.sql.push(')');
                self.params.push(SqlValue::Text(name.clone()));
            }
            Expression::Comparison { tag, op, value } => self.push_comparison(tag, *op, value)?,
            Expression::And(left, right) => self.push_binary(left, "AND", right)?,
            Expression::Or(left, right) => self.push_binary(left, "OR", right)?,
            Expression::Not(operand) => {
                self.sql.push_str("NOT (");
                self.push_expression(operand)?;
                self.sql.push(')');
            }
        }
        Ok(())
    }

    fn push_binary(
        &mut self,
        left: &Expression,
        operator: &str,
        right: &Expression,
    ) -> Result<(), StoreError> {
        self.sql.push('(');
        self.push_expression(left)?;
        self.sql.push(' ');
        self.sql.push_str(operator);
        self.sql.push(' ');
        self.push_expression(right)?;
        self.sql.push(')');
        Ok(())
    }

    fn push_comparison(
        &mut self,
        tag: &str,
        op: ComparisonOp,
        value: &str,
    ) -> Result<(), StoreError> {
        match op {
            ComparisonOp::Eq | ComparisonOp::Ne => {
                if op == ComparisonOp::Ne {
                    self.sql.push_str("NOT ");
                }
                self.sql.push_str("id IN (");
                self.sql.push_str(FILES_WITH_TAG);
                self.sql
                    .push_str(" AND value_id = (SELECT id FROM value WHERE name = ?))");
                self.params.push(SqlValue::Text(tag.to_string()));
                self.params.push(SqlValue::Text(value.to_string()));
            }
            ComparisonOp::Lt | ComparisonOp::Gt | ComparisonOp::Le | ComparisonOp::Ge => {
                match parse_number(value) {
                    Some(number) => self.push_numeric_ordering(tag, op, number)?,
                    None => {
                        self.sql.push_str("id IN (");
                        self.sql.push_str(FILES_WITH_TAG);
                        self.sql
                            .push_str(" AND value_id IN (SELECT id FROM value WHERE name ");
                        self.sql.push_str(op.as_str());
                        self.sql.push_str(" ?))");
                        self.params.push(SqlValue::Text(tag.to_string()));
                        self.params.push(SqlValue::Text(value.to_string()));
                    }
                }
            }
        }
        Ok(())
    }

    /// Numeric comparison against every stored value that itself parses as a number.
    fn push_numeric_ordering(
        &mut self,
        tag: &str,
        op: ComparisonOp,
        operand: f64,
    ) -> Result<(), StoreError> {
        let value_ids = numeric_value_ids_tx(self.tx, op, operand)?;
        if value_ids.is_empty() {
            self.sql.push_str("0 = 1");
            return Ok(());
        }

        self.sql.push_str("id IN (");
        self.sql.push_str(FILES_WITH_TAG);
        self.sql.push_str(" AND value_id IN (");
        self.params.push(SqlValue::Text(tag.to_string()));
        for (index, value_id) in value_ids.into_iter().enumerate() {
            if index > 0 {
                self.sql.push_str(", ");
            }
            self.sql.push('?');
            self.params.push(SqlValue::Integer(value_id));
        }
        self.sql.push_str("))");
        Ok(())
    }

    fn push_scope(&mut self, scope: &str) {
        if scope == "." {
            self.sql.push_str(" AND directory NOT LIKE '/%'");
            return;
        }

        let (directory, name) = paths::split_dir_name(scope);
        self.sql.push_str(
            " AND ((directory = ? AND name = ?) OR directory = ? OR directory LIKE ? ESCAPE '\\')",
        );
        self.params.push(SqlValue::Text(directory));
        self.params.push(SqlValue::Text(name));
        self.params.push(SqlValue::Text(scope.to_string()));
        self.params
            .push(SqlValue::Text(super::descendants_pattern(scope)));
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|number| number.is_finite())
}

fn numeric_value_ids_tx(
    tx: &Transaction<'_>,
    op: ComparisonOp,
    operand: f64,
) -> Result<Vec<i64>, StoreError> {
    let mut stmt = tx.prepare("SELECT id, name FROM value ORDER BY id")?;
    let mut rows = stmt.query(params![])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        let Some(number) = parse_number(&name) else {
            continue;
        };
        let holds = match op {
            ComparisonOp::Lt => number < operand,
            ComparisonOp::Gt => number > operand,
            ComparisonOp::Le => number <= operand,
            ComparisonOp::Ge => number >= operand,
            ComparisonOp::Eq | ComparisonOp::Ne => false,
        };
        if holds {
            out.push(row.get(0)?);
        }
    }
    Ok(out)
}
