//! # Store Module
//!
//! Relational view over the loaded identifications:
//!
//! - `data`: the unioned identification table with a synthetic 1-based `Rec_ID`
//! - `description`: the sample description
//! - `ext_data`: `data ⋈ description USING (Source_File)`, built once and
//!   read-only afterwards
//!
//! Two interchangeable backends implement [`RelationalStore`]: the in-memory
//! [`MemoryStore`] and the SQLite-backed [`SqliteStore`]. Both must answer
//! every query identically.

mod error;
mod group;
mod layout;
mod memory;
mod sqlite;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::info;

pub use error::StoreError;
pub use group::{PeptideGroup, RecordRef};
pub use layout::SampleLayout;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::table::columns::{DESCRIPTION_COLUMNS, REC_ID, SOURCE_FILE};
use crate::table::{SampleDescription, Schema, Table};

/// Relations held by a store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum View {
    /// Unioned identifications
    Data,
    /// Sample description
    Description,
    /// Identifications joined with the sample description
    ExtData,
}

impl View {
    /// Table name used by the SQL backend.
    pub fn table_name(&self) -> &'static str {
        match self {
            View::Data => "data",
            View::Description => "description",
            View::ExtData => "ext_data",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Queryable store of identifications and sample metadata.
pub trait RelationalStore {
    /// Short backend name for logging.
    fn backend_name(&self) -> &'static str;

    /// Bulk-load the identification table and the sample description.
    ///
    /// `data` rows receive `Rec_ID` 1..=n in table order.
    fn load(&mut self, data: Table, description: &SampleDescription) -> Result<(), StoreError>;

    /// Materialize `ext_data` by joining `data` with `description` on
    /// `Source_File`.
    fn join_description(&mut self) -> Result<(), StoreError>;

    /// Number of rows of a relation.
    fn count(&self, view: View) -> Result<usize, StoreError>;

    /// Column layout of `ext_data`.
    fn ext_schema(&self) -> Result<Arc<Schema>, StoreError>;

    /// Distinct non-null sequences of `data` in first-seen order.
    fn distinct_sequences(&self) -> Result<Vec<String>, StoreError>;

    /// All `ext_data` records of one sequence, in `Rec_ID` order.
    fn peptide_group(&self, sequence: &str) -> Result<Option<PeptideGroup>, StoreError>;

    /// Distinct samples of the description with their distinct replicas.
    fn sample_layout(&self) -> Result<SampleLayout, StoreError>;

    /// Join and verify that every identification matched exactly one
    /// description row. Returns the number of joined rows.
    fn build_ext_data(&mut self) -> Result<usize, StoreError> {
        self.join_description()?;
        let data_rows = self.count(View::Data)?;
        let joined_rows = self.count(View::ExtData)?;
        if data_rows != joined_rows {
            return Err(StoreError::ReferentialIntegrity { data_rows, joined_rows });
        }
        info!("Joined {} identifications with the sample description", joined_rows);
        Ok(joined_rows)
    }

    /// All peptide groups in first-seen sequence order.
    fn peptide_groups(&self) -> Result<Vec<PeptideGroup>, StoreError> {
        let mut groups = Vec::new();
        for sequence in self.distinct_sequences()? {
            if let Some(group) = self.peptide_group(&sequence)? {
                groups.push(group);
            }
        }
        Ok(groups)
    }
}

/// Reject data columns the store manages itself or that would clash with the
/// description columns in `ext_data`. Names are compared case-insensitively
/// since SQL identifiers are.
pub(crate) fn check_data_columns(schema: &Schema) -> Result<(), StoreError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for column in schema.columns() {
        let reserved = column.eq_ignore_ascii_case(REC_ID)
            || DESCRIPTION_COLUMNS
                .iter()
                .any(|c| *c != SOURCE_FILE && column.eq_ignore_ascii_case(c));
        if reserved {
            return Err(StoreError::ColumnConflict(column.clone()));
        }
        if seen.insert(column.to_ascii_lowercase(), column).is_some() {
            return Err(StoreError::ColumnConflict(column.clone()));
        }
    }
    Ok(())
}
