#![forbid(unsafe_code)]

use super::implications::implications_list_tx;
use super::support::{FileQuery, FileSelection, build_file_query_tx, read_file};
use super::*;
use rusqlite::params_from_iter;
use std::borrow::Cow;
use tracing::debug;
use tv_core::closure::expand_implications;
use tv_core::query::Expression;

impl StoreTx<'_> {
    /// Number of files matching `expression`, optionally restricted to `scope`.
    ///
    /// Unless `explicit_only`, tags reached through implications count as applied.
    pub fn query_file_count(
        &self,
        expression: &Expression,
        scope: Option<&Path>,
        explicit_only: bool,
    ) -> Result<u64, StoreError> {
        let query = self.file_query(expression, scope, explicit_only, FileSelection::Count)?;
        Ok(self.tx.query_row(
            &query.sql,
            params_from_iter(query.params.iter()),
            |row| row.get(0),
        )?)
    }

    /// Files matching `expression`, optionally restricted to `scope`, in `sort` order.
    pub fn query_files(
        &self,
        expression: &Expression,
        scope: Option<&Path>,
        explicit_only: bool,
        sort: FileSort,
    ) -> Result<Vec<File>, StoreError> {
        let query = self.file_query(expression, scope, explicit_only, FileSelection::Rows(sort))?;
        let mut stmt = self.tx.prepare(&query.sql)?;
        let rows = stmt.query_map(params_from_iter(query.params.iter()), read_file)?;
        let files = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(self.abs_files(files))
    }

    fn file_query(
        &self,
        expression: &Expression,
        scope: Option<&Path>,
        explicit_only: bool,
        selection: FileSelection,
    ) -> Result<FileQuery, StoreError> {
        let expression = if explicit_only {
            Cow::Borrowed(expression)
        } else {
            let implications = implications_list_tx(&self.tx)
                .context_with(|| "could not retrieve tag implications".to_string())?;
            let expanded = expand_implications(expression.clone(), &implications);
            debug!(
                query = %expression,
                expanded = %expanded,
                implications = implications.len(),
                "query expanded"
            );
            Cow::Owned(expanded)
        };

        let scope = scope.map(|scope| self.rel_path(scope)).transpose()?;
        let query = build_file_query_tx(&self.tx, &expression, scope.as_deref(), selection)?;
        debug!(sql = %query.sql, params = query.params.len(), "file query built");
        Ok(query)
    }
}
