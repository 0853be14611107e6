use super::columns::*;
use super::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const PRISM_HEADER: &str = "Feature\tScan\tALC (%)\tSequence\tSource File\tQ\tDecoy\tnetMHC rank\tHLA allele\tHLA-A*02:01\tIntensity";

fn write_file(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

fn write_gz(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).unwrap();
    let mut sink = compression::wrap_writer(file, true);
    sink.write_all((lines.join("\n") + "\n").as_bytes()).unwrap();
    compression::finish_writer(sink).unwrap();
    path
}

#[test]
fn test_derive_label() {
    assert_eq!(derive_label(Path::new("results/prio1.sampleA.csv.gz")), "prio1");
    assert_eq!(derive_label(Path::new("noext")), "noext");
    assert_eq!(derive_label(Path::new("/abs/dir.with.dots/run.csv")), "run");
}

#[test]
fn test_pair_labels() {
    let paths = vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")];

    let derived = InputFile::pair(paths.clone(), vec![]).unwrap();
    assert_eq!(derived[1].resolved_label(), "b");

    let explicit = InputFile::pair(paths.clone(), vec!["prio1".into(), "extra".into()]).unwrap();
    assert_eq!(explicit[1].resolved_label(), "extra");

    let err = InputFile::pair(paths, vec!["prio1".into()]).unwrap_err();
    assert!(matches!(err, LoaderError::LabelCountMismatch { labels: 1, files: 2 }));
    assert!(err.is_configuration());
}

#[test]
fn test_parse_delimiter() {
    assert_eq!(LoaderConfig::parse_delimiter("\\t").unwrap(), b'\t');
    assert_eq!(LoaderConfig::parse_delimiter("\t").unwrap(), b'\t');
    assert_eq!(LoaderConfig::parse_delimiter(",").unwrap(), b',');
    assert_eq!(LoaderConfig::parse_delimiter("comma").unwrap(), b',');
    assert!(LoaderConfig::parse_delimiter("::").is_err());
}

#[test]
fn test_load_union_normalizes_and_stamps() {
    let dir = tempdir().unwrap();
    let first = write_file(
        dir.path(),
        "prio1.runA.tsv",
        &[
            PRISM_HEADER,
            "F1\t10\t95\tPEPTIDEK\trunA.raw\t0.001\tfalse\t0.5\tHLA-A*02:01\t0.5\t1000",
            "F2\t11\t80\tDECOYSEQ\trunA.raw\t0.001\ttrue\t\t\t\t10",
        ],
    );
    let second = write_gz(
        dir.path(),
        "prio2.runB.tsv.gz",
        &[
            "Sequence\tSource File\tQ\tCategory",
            "PEPTIDEK\trunB.raw\t0.02\tCDS",
            "\trunB.raw\t0.5\tCDS",
        ],
    );

    let loader = TableLoader::new(LoaderConfig::default());
    let (table, summary) = loader
        .load(&[InputFile::new(first), InputFile::new(second)])
        .unwrap();

    assert_eq!(summary.files, 2);
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.decoys_dropped, 1);
    assert_eq!(summary.malformed_dropped, 1);

    for column in ["ALC", "Source_File", "netMHC_rank", "HLA_allele", "HLA_A0201", "Category", DATABASES_PRISM] {
        assert!(table.schema().contains(column), "missing {column}");
    }

    assert_eq!(table.get(0, DATABASES_PRISM), Some(&Value::Text("prio1".into())));
    assert_eq!(table.get(1, DATABASES_PRISM), Some(&Value::Text("prio2".into())));
    assert_eq!(table.get(0, Q), Some(&Value::Real(0.001)));
    // Columns absent from the second file are null there
    assert_eq!(table.get(1, "ALC"), Some(&Value::Null));
    assert_eq!(table.get(0, "Category"), Some(&Value::Null));
}

#[test]
fn test_keep_decoys() {
    let dir = tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "run.tsv",
        &["Sequence\tSource_File\tQ\tDecoy", "AAA\tr.raw\t0.1\tTRUE", "BBB\tr.raw\t0.1\tFalse"],
    );

    let config = LoaderConfig {
        drop_decoys: false,
        ..LoaderConfig::default()
    };
    let (table, summary) = TableLoader::new(config).load(&[InputFile::new(path.clone())]).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(summary.decoys_dropped, 0);

    let (table, summary) = TableLoader::new(LoaderConfig::default())
        .load(&[InputFile::new(path)])
        .unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(summary.decoys_dropped, 1);
}

#[test]
fn test_key_columns_stay_text() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "run.csv", &["Sequence,Source_File,Q", "AAA,001,0.1"]);
    let config = LoaderConfig {
        delimiter: b',',
        ..LoaderConfig::default()
    };
    let (table, _) = TableLoader::new(config).load(&[InputFile::new(path)]).unwrap();
    assert_eq!(table.get(0, SOURCE_FILE), Some(&Value::Text("001".into())));
}

#[test]
fn test_column_collision_within_file() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "run.tsv", &["Sequence\tSource_File\tQ\tm/z\tmz", "A\tr\t0.1\t1\t2"]);
    let err = TableLoader::new(LoaderConfig::default())
        .load(&[InputFile::new(path)])
        .unwrap_err();
    match err {
        LoaderError::ColumnCollision { normalized, first, second } => {
            assert_eq!(normalized, "mz");
            assert_eq!(first, "m/z");
            assert_eq!(second, "mz");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_column_collision_across_files() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a.tsv", &["Sequence\tSource_File\tQ\tnetMHC rank", "A\tr\t0.1\t1"]);
    let b = write_file(dir.path(), "b.tsv", &["Sequence\tSource_File\tQ\tnetMHC-rank", "A\tr\t0.1\t1"]);
    let err = TableLoader::new(LoaderConfig::default())
        .load(&[InputFile::new(a), InputFile::new(b)])
        .unwrap_err();
    assert!(matches!(err, LoaderError::ColumnCollision { .. }));
    assert!(err.is_configuration());
}

#[test]
fn test_missing_required_column() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "run.tsv", &["Sequence\tSource_File", "A\tr"]);
    let err = TableLoader::new(LoaderConfig::default())
        .load(&[InputFile::new(path)])
        .unwrap_err();
    assert!(matches!(err, LoaderError::MissingColumn { ref column, .. } if column == "Q"));
}

#[test]
fn test_missing_input_file() {
    let err = TableLoader::new(LoaderConfig::default())
        .load(&[InputFile::new("/nonexistent/prio1.run.csv")])
        .unwrap_err();
    assert!(matches!(err, LoaderError::MissingFile(_)));
}

const SAMPLE_DESCRIPTION: &str = "Source_File\tSample_Name\tSample_Replica\tSample_Type\tComment
runA.raw\tS1\tR1\ttumor\tfirst
runB.raw\tS1\tR2\ttumor\t
runC.raw\tS2\tR1\tbenign\t";

#[test]
fn test_sample_description_parsing() {
    let reader = std::io::Cursor::new(SAMPLE_DESCRIPTION);
    let description = SampleDescription::from_reader(reader, Path::new("samples.tsv")).unwrap();

    assert_eq!(description.len(), 3);
    assert_eq!(description.entries[0], SampleEntry::new("runA.raw", "S1", "R1", "tumor"));
    assert_eq!(description.entries[2].sample_type, "benign");
}

#[test]
fn test_sample_description_missing_column() {
    let reader = std::io::Cursor::new("Source_File\tSample_Name\tSample_Type\nrunA.raw\tS1\ttumor\n");
    let err = SampleDescription::from_reader(reader, Path::new("samples.tsv")).unwrap_err();
    assert!(matches!(err, LoaderError::MissingColumn { ref column, .. } if column == SAMPLE_REPLICA));
}

#[test]
fn test_sample_description_missing_file() {
    let err = SampleDescription::from_tsv_file("/nonexistent/samples.tsv").unwrap_err();
    assert!(matches!(err, LoaderError::MissingFile(_)));
}
