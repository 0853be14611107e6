//! # Table Module
//!
//! Reading of the delimited inputs of a combine run:
//!
//! - identification tables produced by PRISM (one per run and category),
//!   unioned into one normalized [`Table`] by [`TableLoader`]
//! - the tab-delimited [`SampleDescription`] mapping each source file to a
//!   sample, replica and sample type
//!
//! Cells are typed on read ([`Value`]) and addressed by normalized column
//! name through a [`Schema`].

pub mod category;
pub mod columns;
pub mod compression;
mod description;
mod error;
mod loader;
mod value;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

pub use category::SearchCategory;
pub use description::{SampleDescription, SampleEntry};
pub use error::LoaderError;
pub use loader::{derive_label, InputFile, LoadSummary, LoaderConfig, TableLoader};
pub use value::Value;

/// Ordered column names with O(1) lookup by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    columns: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Schema {
    /// Build a schema from column names. Later duplicates are ignored.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Self::default();
        for column in columns {
            schema.push(column);
        }
        schema
    }

    /// Append a column if it is not present yet and return its position.
    pub fn push(&mut self, column: impl Into<String>) -> usize {
        let column = column.into();
        if let Some(&pos) = self.positions.get(&column) {
            return pos;
        }
        let pos = self.columns.len();
        self.positions.insert(column.clone(), pos);
        self.columns.push(column);
        pos
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    /// Whether the schema has a column.
    pub fn contains(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// An in-memory table of typed cells.
///
/// Every row is as wide as the schema.
#[derive(Debug, Clone, Default)]
pub struct Table {
    schema: Schema,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schema: Schema::new(columns),
            rows: Vec::new(),
        }
    }

    /// Table schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        self.schema.columns()
    }

    /// All rows.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Consume the table into its schema and rows.
    pub fn into_parts(self) -> (Schema, Vec<Vec<Value>>) {
        (self.schema, self.rows)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Add a column (null in all existing rows) unless it exists; returns its position.
    pub fn ensure_column(&mut self, column: &str) -> usize {
        if let Some(pos) = self.schema.position(column) {
            return pos;
        }
        let pos = self.schema.push(column);
        for row in &mut self.rows {
            row.resize(self.schema.len(), Value::Null);
        }
        pos
    }

    /// Append a row, padding it with nulls to the table width.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.schema.len(), Value::Null);
        self.rows.push(row);
    }

    /// Cell by row index and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let pos = self.schema.position(column)?;
        self.rows.get(row).and_then(|r| r.get(pos))
    }

    /// All values of one column, in row order.
    pub fn column_values<'a>(&'a self, column: &str) -> impl Iterator<Item = &'a Value> + 'a {
        let pos = self.schema.position(column);
        self.rows
            .iter()
            .filter_map(move |row| pos.and_then(|p| row.get(p)))
    }
}
