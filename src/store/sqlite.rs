use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, params_from_iter, Connection};

use super::{check_data_columns, PeptideGroup, RelationalStore, SampleLayout, StoreError, View};
use crate::table::columns::{REC_ID, SAMPLE_NAME, SAMPLE_REPLICA, SAMPLE_TYPE, SEQUENCE, SOURCE_FILE};
use crate::table::{SampleDescription, Schema, Table, Value};

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Owned(rusqlite::types::Value::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

impl FromSql for Value {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) | ValueRef::Blob(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        })
    }
}

/// Quote an identifier for use in SQL.
fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// SQLite-backed store, transient (`:memory:`) or on disk.
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
    loaded: bool,
    ext_schema: Option<Arc<Schema>>,
}

impl SqliteStore {
    /// Open a transient in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            path: None,
            loaded: false,
            ext_schema: None,
        })
    }

    /// Open a fresh on-disk database, removing any existing file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if path.exists() {
            warn!("Removing existing database {}", path.display());
            std::fs::remove_file(path)?;
        }
        Ok(Self {
            conn: Connection::open(path)?,
            path: Some(path.to_path_buf()),
            loaded: false,
            ext_schema: None,
        })
    }

    /// Path of the database file, `None` for a transient database.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn ext_schema_ref(&self) -> Result<&Arc<Schema>, StoreError> {
        self.ext_schema.as_ref().ok_or(StoreError::NotLoaded("ext_data"))
    }

    fn ensure_loaded(&self) -> Result<(), StoreError> {
        if self.loaded {
            Ok(())
        } else {
            Err(StoreError::NotLoaded("data"))
        }
    }

    fn read_rows(&self, sql: &str, params: impl rusqlite::Params, width: usize) -> Result<Vec<Vec<Value>>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, |row| (0..width).map(|i| row.get::<_, Value>(i)).collect())?
            .collect::<Result<Vec<Vec<Value>>, _>>()?;
        Ok(rows)
    }
}

impl RelationalStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn load(&mut self, data: Table, description: &SampleDescription) -> Result<(), StoreError> {
        check_data_columns(data.schema())?;
        let (schema, rows) = data.into_parts();

        self.conn.execute_batch(
            "DROP TABLE IF EXISTS ext_data;
             DROP TABLE IF EXISTS data;
             DROP TABLE IF EXISTS description;",
        )?;

        // Data columns carry no declared type so values keep the type they were read with
        let column_defs: Vec<String> = std::iter::once(format!("{} INTEGER PRIMARY KEY", quote(REC_ID)))
            .chain(schema.columns().iter().map(|c| quote(c)))
            .collect();
        self.conn
            .execute(&format!("CREATE TABLE data ({})", column_defs.join(", ")), [])?;
        self.conn.execute(
            &format!(
                "CREATE TABLE description ({} TEXT, {} TEXT, {} TEXT, {} TEXT)",
                quote(SOURCE_FILE),
                quote(SAMPLE_NAME),
                quote(SAMPLE_REPLICA),
                quote(SAMPLE_TYPE)
            ),
            [],
        )?;

        let tx = self.conn.transaction()?;
        {
            let names: Vec<String> = std::iter::once(REC_ID)
                .chain(schema.columns().iter().map(String::as_str))
                .map(quote)
                .collect();
            let placeholders = vec!["?"; names.len()].join(", ");
            let mut insert = tx.prepare(&format!(
                "INSERT INTO data ({}) VALUES ({})",
                names.join(", "),
                placeholders
            ))?;
            for (i, row) in rows.iter().enumerate() {
                let rec_id = Value::Integer(i as i64 + 1);
                insert.execute(params_from_iter(std::iter::once(&rec_id).chain(row.iter())))?;
            }

            let mut insert = tx.prepare("INSERT INTO description VALUES (?1, ?2, ?3, ?4)")?;
            for entry in &description.entries {
                insert.execute(params![
                    entry.source_file,
                    entry.sample_name,
                    entry.sample_replica,
                    entry.sample_type
                ])?;
            }
        }
        tx.commit()?;

        self.conn.execute(
            &format!("CREATE INDEX IF NOT EXISTS source_file_index ON description ({})", quote(SOURCE_FILE)),
            [],
        )?;
        self.loaded = true;
        self.ext_schema = None;
        debug!(
            "Loaded {} data rows and {} description rows into SQLite",
            rows.len(),
            description.len()
        );
        Ok(())
    }

    fn join_description(&mut self) -> Result<(), StoreError> {
        self.ensure_loaded()?;
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS ext_data;
             CREATE TABLE ext_data AS
                 SELECT * FROM data INNER JOIN description USING ({source})
                 ORDER BY {rec_id};
             CREATE INDEX IF NOT EXISTS sequence_index ON ext_data ({sequence});",
            source = quote(SOURCE_FILE),
            rec_id = quote(REC_ID),
            sequence = quote(SEQUENCE),
        ))?;

        let columns: Vec<String> = {
            let stmt = self.conn.prepare("SELECT * FROM ext_data LIMIT 0")?;
            stmt.column_names().into_iter().map(str::to_string).collect()
        };
        self.ext_schema = Some(Arc::new(Schema::new(columns)));
        Ok(())
    }

    fn count(&self, view: View) -> Result<usize, StoreError> {
        match view {
            View::ExtData => {
                self.ext_schema_ref()?;
            }
            View::Data | View::Description => self.ensure_loaded()?,
        }
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", view.table_name()), [], |row| row.get(0))?;
        Ok(n as usize)
    }

    fn ext_schema(&self) -> Result<Arc<Schema>, StoreError> {
        self.ext_schema_ref().cloned()
    }

    fn distinct_sequences(&self) -> Result<Vec<String>, StoreError> {
        self.ensure_loaded()?;
        let sql = format!(
            "SELECT {seq} FROM data WHERE {seq} IS NOT NULL GROUP BY {seq} ORDER BY MIN({rec_id})",
            seq = quote(SEQUENCE),
            rec_id = quote(REC_ID)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let sequences = stmt
            .query_map([], |row| row.get::<_, Value>(0))?
            .map(|v| v.map(|v| v.to_string()))
            .collect::<Result<Vec<String>, _>>()?;
        Ok(sequences)
    }

    fn peptide_group(&self, sequence: &str) -> Result<Option<PeptideGroup>, StoreError> {
        let schema = Arc::clone(self.ext_schema_ref()?);
        let sql = format!(
            "SELECT * FROM ext_data WHERE {} = ?1 ORDER BY {}",
            quote(SEQUENCE),
            quote(REC_ID)
        );
        let records = self.read_rows(&sql, [sequence], schema.len())?;
        if records.is_empty() {
            return Ok(None);
        }
        Ok(Some(PeptideGroup::new(sequence, schema, records)))
    }

    /// One ordered scan of `ext_data`, grouped by sequence in first-seen order.
    fn peptide_groups(&self) -> Result<Vec<PeptideGroup>, StoreError> {
        let schema = Arc::clone(self.ext_schema_ref()?);
        let Some(sequence_pos) = schema.position(SEQUENCE) else {
            return Ok(Vec::new());
        };
        let sql = format!("SELECT * FROM ext_data ORDER BY {}", quote(REC_ID));
        let rows = self.read_rows(&sql, [], schema.len())?;

        let mut order: Vec<(String, Vec<Vec<Value>>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for row in rows {
            let sequence = match row.get(sequence_pos) {
                None | Some(Value::Null) => continue,
                Some(v) => v.to_string(),
            };
            let slot = *index.entry(sequence.clone()).or_insert_with(|| {
                order.push((sequence, Vec::new()));
                order.len() - 1
            });
            order[slot].1.push(row);
        }

        Ok(order
            .into_iter()
            .map(|(sequence, records)| PeptideGroup::new(sequence, Arc::clone(&schema), records))
            .collect())
    }

    fn sample_layout(&self) -> Result<SampleLayout, StoreError> {
        self.ensure_loaded()?;
        let sql = format!(
            "SELECT DISTINCT {name}, {replica} FROM description ORDER BY {name}, {replica}",
            name = quote(SAMPLE_NAME),
            replica = quote(SAMPLE_REPLICA)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let pairs = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SampleLayout::from_pairs(pairs))
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .field("loaded", &self.loaded)
            .finish()
    }
}
