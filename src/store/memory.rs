use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::debug;

use super::{check_data_columns, PeptideGroup, RelationalStore, SampleLayout, StoreError, View};
use crate::table::columns::{REC_ID, SAMPLE_NAME, SAMPLE_REPLICA, SAMPLE_TYPE, SEQUENCE, SOURCE_FILE};
use crate::table::{SampleDescription, SampleEntry, Schema, Table, Value};

/// In-memory store with hash indexes on `Source_File` and `Sequence`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data_schema: Option<Schema>,
    data: Vec<Vec<Value>>,
    description: Vec<SampleEntry>,
    /// description rows by Source_File
    source_file_index: HashMap<String, Vec<usize>>,
    ext_schema: Option<Arc<Schema>>,
    ext_data: Vec<Vec<Value>>,
    /// ext_data rows by Sequence
    sequence_index: HashMap<String, Vec<usize>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn data_schema(&self) -> Result<&Schema, StoreError> {
        self.data_schema.as_ref().ok_or(StoreError::NotLoaded("data"))
    }

    fn ext_schema_ref(&self) -> Result<&Arc<Schema>, StoreError> {
        self.ext_schema.as_ref().ok_or(StoreError::NotLoaded("ext_data"))
    }
}

fn key(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.to_string()),
    }
}

impl RelationalStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn load(&mut self, data: Table, description: &SampleDescription) -> Result<(), StoreError> {
        check_data_columns(data.schema())?;
        let (schema, rows) = data.into_parts();

        let data_schema = Schema::new(std::iter::once(REC_ID.to_string()).chain(schema.columns().iter().cloned()));
        self.data = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let mut full = Vec::with_capacity(row.len() + 1);
                full.push(Value::Integer(i as i64 + 1));
                full.extend(row);
                full
            })
            .collect();
        self.data_schema = Some(data_schema);

        self.description = description.entries.clone();
        self.source_file_index.clear();
        for (i, entry) in self.description.iter().enumerate() {
            self.source_file_index
                .entry(entry.source_file.clone())
                .or_default()
                .push(i);
        }

        self.ext_schema = None;
        self.ext_data.clear();
        self.sequence_index.clear();
        debug!(
            "Loaded {} data rows and {} description rows into memory",
            self.data.len(),
            self.description.len()
        );
        Ok(())
    }

    fn join_description(&mut self) -> Result<(), StoreError> {
        let data_schema = self.data_schema()?;
        let source_pos = data_schema.position(SOURCE_FILE);

        let ext_schema = Schema::new(
            data_schema
                .columns()
                .iter()
                .map(String::as_str)
                .chain([SAMPLE_NAME, SAMPLE_REPLICA, SAMPLE_TYPE]),
        );
        let sequence_pos = ext_schema.position(SEQUENCE);

        let mut ext_data = Vec::with_capacity(self.data.len());
        for row in &self.data {
            let Some(source_file) = key(source_pos.and_then(|p| row.get(p))) else {
                continue;
            };
            let Some(matches) = self.source_file_index.get(&source_file) else {
                continue;
            };
            for &i in matches {
                let entry = &self.description[i];
                let mut joined = row.clone();
                joined.push(Value::Text(entry.sample_name.clone()));
                joined.push(Value::Text(entry.sample_replica.clone()));
                joined.push(Value::Text(entry.sample_type.clone()));
                ext_data.push(joined);
            }
        }

        let mut sequence_index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, row) in ext_data.iter().enumerate() {
            if let Some(sequence) = key(sequence_pos.and_then(|p| row.get(p))) {
                sequence_index.entry(sequence).or_default().push(i);
            }
        }

        self.ext_schema = Some(Arc::new(ext_schema));
        self.ext_data = ext_data;
        self.sequence_index = sequence_index;
        Ok(())
    }

    fn count(&self, view: View) -> Result<usize, StoreError> {
        match view {
            View::Data => self.data_schema().map(|_| self.data.len()),
            View::Description => Ok(self.description.len()),
            View::ExtData => self.ext_schema_ref().map(|_| self.ext_data.len()),
        }
    }

    fn ext_schema(&self) -> Result<Arc<Schema>, StoreError> {
        self.ext_schema_ref().cloned()
    }

    fn distinct_sequences(&self) -> Result<Vec<String>, StoreError> {
        let sequence_pos = self.data_schema()?.position(SEQUENCE);
        let mut seen = HashSet::new();
        let mut sequences = Vec::new();
        for row in &self.data {
            if let Some(sequence) = key(sequence_pos.and_then(|p| row.get(p))) {
                if seen.insert(sequence.clone()) {
                    sequences.push(sequence);
                }
            }
        }
        Ok(sequences)
    }

    fn peptide_group(&self, sequence: &str) -> Result<Option<PeptideGroup>, StoreError> {
        let schema = self.ext_schema_ref()?;
        Ok(self.sequence_index.get(sequence).map(|rows| {
            let records = rows.iter().map(|&i| self.ext_data[i].clone()).collect();
            PeptideGroup::new(sequence, Arc::clone(schema), records)
        }))
    }

    fn sample_layout(&self) -> Result<SampleLayout, StoreError> {
        Ok(SampleLayout::from_pairs(
            self.description
                .iter()
                .map(|e| (e.sample_name.as_str(), e.sample_replica.as_str())),
        ))
    }
}
