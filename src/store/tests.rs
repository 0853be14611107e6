use super::*;
use crate::table::columns::*;
use crate::table::{SampleEntry, Value};
use tempfile::tempdir;

fn description() -> SampleDescription {
    SampleDescription::new(vec![
        SampleEntry::new("runA.raw", "S1", "R1", "tumor"),
        SampleEntry::new("runB.raw", "S1", "R2", "tumor"),
        SampleEntry::new("runC.raw", "S2", "R1", "benign"),
    ])
}

fn data() -> Table {
    let mut table = Table::new([SEQUENCE, SOURCE_FILE, Q, INTENSITY, DATABASES_PRISM]);
    for (seq, file, q, intensity, label) in [
        ("PEPTIDEK", "runA.raw", 0.001, 1000.0, "prio1"),
        ("ABCDEFGHIK", "runB.raw", 0.005, 250.0, "prio1"),
        ("PEPTIDEK", "runC.raw", 0.02, 10.5, "prio2"),
        ("ABCDEFGHIK", "runA.raw", 0.02, 50.0, "prio2"),
    ] {
        table.push_row(vec![
            Value::Text(seq.into()),
            Value::Text(file.into()),
            Value::Real(q),
            Value::Real(intensity),
            Value::Text(label.into()),
        ]);
    }
    table
}

fn backends() -> Vec<Box<dyn RelationalStore>> {
    vec![
        Box::new(MemoryStore::new()),
        Box::new(SqliteStore::open_in_memory().unwrap()),
    ]
}

#[test]
fn test_build_ext_data() {
    for mut store in backends() {
        store.load(data(), &description()).unwrap();
        assert_eq!(store.build_ext_data().unwrap(), 4, "{}", store.backend_name());
        assert_eq!(store.count(View::Data).unwrap(), 4);
        assert_eq!(store.count(View::Description).unwrap(), 3);

        let schema = store.ext_schema().unwrap();
        assert_eq!(
            schema.columns(),
            &[REC_ID, SEQUENCE, SOURCE_FILE, Q, INTENSITY, DATABASES_PRISM, SAMPLE_NAME, SAMPLE_REPLICA, SAMPLE_TYPE]
        );
    }
}

#[test]
fn test_missing_description_row_breaks_integrity() {
    let partial = SampleDescription::new(vec![
        SampleEntry::new("runA.raw", "S1", "R1", "tumor"),
        SampleEntry::new("runB.raw", "S1", "R2", "tumor"),
    ]);
    for mut store in backends() {
        store.load(data(), &partial).unwrap();
        let err = store.build_ext_data().unwrap_err();
        assert!(
            matches!(err, StoreError::ReferentialIntegrity { data_rows: 4, joined_rows: 3 }),
            "{}: {err}",
            store.backend_name()
        );
    }
}

#[test]
fn test_duplicate_description_row_breaks_integrity() {
    let mut duplicated = description();
    duplicated
        .entries
        .push(SampleEntry::new("runC.raw", "S3", "R1", "benign"));
    for mut store in backends() {
        store.load(data(), &duplicated).unwrap();
        let err = store.build_ext_data().unwrap_err();
        assert!(matches!(err, StoreError::ReferentialIntegrity { data_rows: 4, joined_rows: 5 }));
    }
}

#[test]
fn test_distinct_sequences_first_seen() {
    for mut store in backends() {
        store.load(data(), &description()).unwrap();
        store.build_ext_data().unwrap();
        assert_eq!(store.distinct_sequences().unwrap(), vec!["PEPTIDEK", "ABCDEFGHIK"]);
    }
}

#[test]
fn test_peptide_group_lookup() {
    for mut store in backends() {
        store.load(data(), &description()).unwrap();
        store.build_ext_data().unwrap();

        let group = store.peptide_group("ABCDEFGHIK").unwrap().unwrap();
        assert_eq!(group.len(), 2);
        let ids: Vec<_> = group.records().map(|r| r.rec_id()).collect();
        assert_eq!(ids, vec![Some(2), Some(4)]);
        assert_eq!(group.group_concat_distinct(SAMPLE_REPLICA, false), "R2,R1");
        assert_eq!(group.max(INTENSITY), Some(250.0));

        assert!(store.peptide_group("MISSING").unwrap().is_none());
    }
}

#[test]
fn test_peptide_groups_agree_across_backends() {
    let mut memory = MemoryStore::new();
    let mut sqlite = SqliteStore::open_in_memory().unwrap();
    memory.load(data(), &description()).unwrap();
    sqlite.load(data(), &description()).unwrap();
    memory.build_ext_data().unwrap();
    sqlite.build_ext_data().unwrap();

    let a = memory.peptide_groups().unwrap();
    let b = sqlite.peptide_groups().unwrap();
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.sequence(), y.sequence());
        let xs: Vec<Vec<Value>> = x.records().map(|r| columns_of(&r)).collect();
        let ys: Vec<Vec<Value>> = y.records().map(|r| columns_of(&r)).collect();
        assert_eq!(xs, ys);
    }
}

fn columns_of(record: &RecordRef<'_>) -> Vec<Value> {
    record
        .schema()
        .columns()
        .iter()
        .map(|c| record.value(c))
        .collect()
}

#[test]
fn test_sample_layout() {
    for mut store in backends() {
        store.load(data(), &description()).unwrap();
        let layout = store.sample_layout().unwrap();
        assert_eq!(
            layout.cells().collect::<Vec<_>>(),
            vec![("S1", "R1"), ("S1", "R2"), ("S2", "R1")]
        );
    }
}

#[test]
fn test_column_conflict() {
    let mut table = data();
    table.ensure_column("sample_name");
    for mut store in backends() {
        let err = store.load(table.clone(), &description()).unwrap_err();
        assert!(matches!(err, StoreError::ColumnConflict(ref c) if c == "sample_name"));
    }
}

#[test]
fn test_queries_before_load() {
    for store in backends() {
        assert!(matches!(store.distinct_sequences(), Err(StoreError::NotLoaded(_))));
        assert!(matches!(store.ext_schema(), Err(StoreError::NotLoaded(_))));
    }
}

#[test]
fn test_sqlite_on_disk_replaces_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("combined.db");
    std::fs::write(&path, b"not a database").unwrap();

    let mut store = SqliteStore::open(&path).unwrap();
    store.load(data(), &description()).unwrap();
    assert_eq!(store.build_ext_data().unwrap(), 4);
    assert_eq!(store.path(), Some(path.as_path()));
    assert!(path.exists());
}

#[test]
fn test_busy_maps_to_retryable() {
    let busy = rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
        Some("database is locked".into()),
    );
    assert!(StoreError::from(busy).is_retryable());
    assert!(!StoreError::from(rusqlite::Error::InvalidQuery).is_retryable());
}
