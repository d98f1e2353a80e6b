//! Query results
//!
//! A [`Cursor`] is filled while the prepared statement is alive and owns
//! plain values afterwards, so nothing in SQLite stays open once `query`
//! has returned.

use crate::values::{ContentValues, Value};
use rusqlite::Statement;

/// Materialised result of a query: column names plus rows in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cursor {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Cursor {
    /// Run a prepared statement to completion and collect every row
    pub(crate) fn collect<P: rusqlite::Params>(
        stmt: &mut Statement<'_>,
        params: P,
    ) -> rusqlite::Result<Self> {
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut result = stmt.query(params)?;
        while let Some(row) = result.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(Value::from(row.get_ref(i)?));
            }
            rows.push(values);
        }

        Ok(Self { columns, rows })
    }

    /// Number of rows
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column in every row, if it was projected
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Row at `position`, or `None` past the end
    pub fn row(&self, position: usize) -> Option<CursorRow<'_>> {
        self.rows.get(position).map(|values| CursorRow {
            cursor: self,
            values,
        })
    }

    pub fn first(&self) -> Option<CursorRow<'_>> {
        self.row(0)
    }

    pub fn last(&self) -> Option<CursorRow<'_>> {
        self.count().checked_sub(1).and_then(|i| self.row(i))
    }

    pub fn rows(&self) -> impl Iterator<Item = CursorRow<'_>> {
        self.rows.iter().map(move |values| CursorRow {
            cursor: self,
            values,
        })
    }

    /// Rows keyed by column name, e.g. for JSON output
    pub fn to_values(&self) -> Vec<ContentValues> {
        self.rows()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.values.iter().cloned())
                    .collect()
            })
            .collect()
    }

    /// Release the result explicitly
    pub fn close(self) {}
}

/// Borrowed view of one cursor row.
#[derive(Debug, Clone, Copy)]
pub struct CursorRow<'a> {
    cursor: &'a Cursor,
    values: &'a [Value],
}

impl<'a> CursorRow<'a> {
    pub fn get(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index)
    }

    pub fn get_by_name(&self, column: &str) -> Option<&'a Value> {
        self.cursor.column_index(column).and_then(|i| self.get(i))
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get_by_name(column).and_then(Value::as_i64)
    }

    pub fn get_str(&self, column: &str) -> Option<&'a str> {
        self.get_by_name(column).and_then(Value::as_str)
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }
}
