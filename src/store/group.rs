use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use crate::table::columns::REC_ID;
use crate::table::{Schema, Value};

/// All extended records sharing one `Sequence`, in `Rec_ID` order.
///
/// Offers the aggregate primitives the resolver needs (ordered top-1, max,
/// DISTINCT, GROUP_CONCAT(DISTINCT), first equality match) without going back
/// to the store.
#[derive(Debug, Clone)]
pub struct PeptideGroup {
    sequence: String,
    schema: Arc<Schema>,
    records: Vec<Vec<Value>>,
}

/// Borrowed view of one record of a [`PeptideGroup`].
#[derive(Debug, Clone, Copy)]
pub struct RecordRef<'a> {
    schema: &'a Schema,
    values: &'a [Value],
}

impl<'a> RecordRef<'a> {
    /// Cell by column name; `None` if the column does not exist.
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.schema.position(column).and_then(|pos| self.values.get(pos))
    }

    /// Cell by column name, null if the column does not exist.
    pub fn value(&self, column: &str) -> Value {
        self.get(column).cloned().unwrap_or_default()
    }

    /// Whether the record's schema has the column.
    pub fn has_column(&self, column: &str) -> bool {
        self.schema.contains(column)
    }

    /// Synthetic row identifier.
    pub fn rec_id(&self) -> Option<i64> {
        match self.get(REC_ID) {
            Some(Value::Integer(id)) => Some(*id),
            _ => None,
        }
    }

    /// Schema of the record.
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }
}

impl PeptideGroup {
    /// Create a group. `records` must be ordered by `Rec_ID` and aligned to `schema`.
    pub fn new(sequence: impl Into<String>, schema: Arc<Schema>, records: Vec<Vec<Value>>) -> Self {
        Self {
            sequence: sequence.into(),
            schema,
            records,
        }
    }

    /// Peptide sequence shared by all records.
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Schema of the records.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the group has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in `Rec_ID` order.
    pub fn records(&self) -> impl Iterator<Item = RecordRef<'_>> + '_ {
        self.records.iter().map(move |values| RecordRef {
            schema: &self.schema,
            values,
        })
    }

    /// `ORDER BY keys... LIMIT 1`: ascending on every key in turn, values
    /// without a numeric reading last, ties resolved by `Rec_ID`.
    pub fn ordered_top(&self, keys: &[&str]) -> Option<RecordRef<'_>> {
        static NULL: Value = Value::Null;
        fn cell(row: &[Value], pos: Option<usize>) -> &Value {
            pos.and_then(|p| row.get(p)).unwrap_or(&NULL)
        }
        let positions: Vec<Option<usize>> = keys.iter().map(|k| self.schema.position(k)).collect();
        // min_by keeps the first of several equal minima
        self.records
            .iter()
            .min_by(|a, b| {
                positions
                    .iter()
                    .map(|&pos| cell(a, pos).cmp_numeric_nulls_last(cell(b, pos)))
                    .find(|ord| *ord != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            })
            .map(|values| RecordRef {
                schema: &self.schema,
                values,
            })
    }

    /// `MAX(column)` over numeric values; `None` when there are none.
    pub fn max(&self, column: &str) -> Option<f64> {
        let pos = self.schema.position(column)?;
        self.records
            .iter()
            .filter_map(|row| row.get(pos).and_then(Value::as_f64))
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
    }

    /// `DISTINCT column`: non-null values rendered as text, first-seen order.
    pub fn distinct(&self, column: &str) -> Vec<String> {
        let Some(pos) = self.schema.position(column) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for value in self.records.iter().filter_map(|row| row.get(pos)) {
            if value.is_null() {
                continue;
            }
            let text = value.to_string();
            if seen.insert(text.clone()) {
                out.push(text);
            }
        }
        out
    }

    /// `GROUP_CONCAT(DISTINCT column)` joined by `,`, in first-seen order or
    /// sorted lexicographically.
    pub fn group_concat_distinct(&self, column: &str, sorted: bool) -> String {
        let mut values = self.distinct(column);
        if sorted {
            values.sort();
        }
        values.join(",")
    }

    /// First record (lowest `Rec_ID`) whose columns equal all given texts.
    pub fn first_where(&self, conditions: &[(&str, &str)]) -> Option<RecordRef<'_>> {
        let positions: Option<Vec<(usize, &str)>> = conditions
            .iter()
            .map(|(column, expected)| self.schema.position(column).map(|p| (p, *expected)))
            .collect();
        let positions = positions?;
        self.records()
            .find(|record| {
                positions.iter().all(|(pos, expected)| match record.values.get(*pos) {
                    Some(Value::Null) | None => false,
                    Some(value) => value.to_string() == *expected,
                })
            })
    }
}
