//! Integration tests for prism-combine
//!
//! These tests run the full pipeline from delimited files on disk to the
//! combined table.

use prism_combine::combine::{self, CombineConfig, StoreBackend};
use prism_combine::output::TableSummary;
use prism_combine::table::category::discover_inputs;
use prism_combine::table::compression::open_reader;
use prism_combine::table::InputFile;
use prism_combine::{CombineError, ErrorKind};
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const HEADER: &str =
    "Feature\tScan\tALC (%)\tSequence\tSource File\tQ\tDecoy\tnetMHC rank\tHLA allele\tHLA-A*02:01\tHLA-B*07:02\tCategory\tIntensity";

const DESCRIPTION: &str = "Source_File\tSample_Name\tSample_Replica\tSample_Type
runA.raw\tS1\tR1\ttumor
runB.raw\tS1\tR2\ttumor
runC.raw\tS2\tR1\tbenign
";

fn write_file(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

/// Read a combined table into one map per row.
fn read_output(path: &Path) -> Vec<HashMap<String, String>> {
    let mut text = String::new();
    open_reader(path).unwrap().read_to_string(&mut text).unwrap();
    let mut lines = text.lines();
    let header: Vec<&str> = lines.next().unwrap().split('\t').collect();
    lines
        .map(|line| {
            header
                .iter()
                .zip(line.split('\t'))
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect()
        })
        .collect()
}

fn header_of(path: &Path) -> Vec<String> {
    let mut text = String::new();
    open_reader(path).unwrap().read_to_string(&mut text).unwrap();
    text.lines().next().unwrap().split('\t').map(String::from).collect()
}

/// Two categories over three runs.
fn two_category_fixture(dir: &Path) -> CombineConfig {
    let prio1 = write_file(
        dir,
        "prio1.batch.tsv",
        &[
            HEADER,
            "F1\t101\t92\tABCDEFGHIK\trunA.raw\t0.005\tfalse\t0.4\tHLA-A*02:01\t0.4\t5.0\tCDS\t1000",
            "F2\t102\t75\tSIINFEKL\trunC.raw\t0.5\tfalse\t\t\t\t\tUTR5\t50",
            "F3\t103\t60\tKLLDDEEPP\trunA.raw\t0.001\tTRUE\t0.1\tHLA-A*02:01\t0.1\t0.2\tCDS\t10",
        ],
    );
    let prio2 = write_file(
        dir,
        "prio2.batch.tsv",
        &[
            HEADER,
            "F4\t201\t95\tABCDEFGHIK\trunB.raw\t0.02\tfalse\t0.3\tHLA-B*07:02\t3.0\t0.3\tExtra\t400",
            "F5\t202\t70\tSIINFEKL\trunB.raw\t0.009\tfalse\t1.0\tHLA-B*07:02\t4.0\t1.0\tncRNA\t20",
        ],
    );
    let description = write_file(dir, "samples.tsv", &[DESCRIPTION.trim_end()]);

    let mut config = CombineConfig::new(
        vec![InputFile::new(prio1), InputFile::new(prio2)],
        description,
    );
    config.output = dir.join("combined.tsv.gz");
    config
}

#[test]
fn test_combine_end_to_end() {
    let dir = tempdir().unwrap();
    let config = two_category_fixture(dir.path());

    let stats = combine::run(&config).unwrap();
    assert_eq!(stats.load.files, 2);
    assert_eq!(stats.load.decoys_dropped, 1);
    assert_eq!(stats.peptides, 2);
    assert_eq!(stats.peptides_written, 2);
    assert!(stats.output.compressed);

    let rows = read_output(&config.output);
    assert_eq!(rows.len(), 2);

    // Best record across both files is the prio1 hit at Q 0.005
    let abc = &rows[0];
    assert_eq!(abc["Sequence"], "ABCDEFGHIK");
    assert_eq!(abc["Best_Q"], "0.005");
    assert_eq!(abc["Source_File"], "runA.raw");
    assert_eq!(abc["Best_ALC"], "95");
    assert_eq!(abc["Databases_PRISM"], "prio1,prio2");
    assert_eq!(abc["Filtered_HLA_allele"], "HLA_A0201");
    assert_eq!(abc["Samples"], "S1");
    assert_eq!(abc["S1"], "2");
    assert_eq!(abc["S2"], "0");
    assert_eq!(abc["Intensity_S1_R1"], "1000");
    assert_eq!(abc["Intensity_S1_R2"], "400");
    assert_eq!(abc["Intensity_S2_R1"], "0");
    assert_eq!(abc["Intensity_Sum"], "1400");

    // Lower Q in prio2 wins although prio1 lists the peptide first
    let siin = &rows[1];
    assert_eq!(siin["Sequence"], "SIINFEKL");
    assert_eq!(siin["Best_Q"], "0.009");
    assert_eq!(siin["Filtered_HLA_allele"], "HLA_B0702");
    assert_eq!(siin["Status_over_sequence"], "benign,tumor");
}

#[test]
fn test_output_column_order() {
    let dir = tempdir().unwrap();
    let config = two_category_fixture(dir.path());
    combine::run(&config).unwrap();

    let header = header_of(&config.output);
    let position = |name: &str| header.iter().position(|h| h == name).unwrap();
    assert_eq!(header[0], "Source_File");
    assert!(position("netMHC_rank") < position("HLA_A0201"));
    assert!(position("HLA_B0702") < position("Filtered_HLA_allele"));
    assert!(position("Samples") < position("S1"));
    assert_eq!(position("Intensity_Sum") + 1, position("Intensity_S1_R1"));
    assert_eq!(header.last().map(String::as_str), Some("Intensity_S2_R1"));

    let summary = TableSummary::read(&config.output).unwrap();
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.allele_columns, vec!["HLA_A0201", "HLA_B0702"]);
    assert_eq!(summary.sample_columns, vec!["S1", "S2"]);
    assert_eq!(summary.intensity_columns.len(), 3);
}

#[test]
fn test_quality_gate_drops_peptides() {
    let dir = tempdir().unwrap();
    let mut config = two_category_fixture(dir.path());
    config.resolver.q_threshold = Some(0.009);

    let stats = combine::run(&config).unwrap();
    assert_eq!(stats.peptides_written, 1);
    assert_eq!(stats.peptides_dropped, 1);

    // Q equal to the threshold is excluded
    let rows = read_output(&config.output);
    assert_eq!(rows[0]["Sequence"], "ABCDEFGHIK");
}

#[test]
fn test_incomplete_description_writes_nothing() {
    let dir = tempdir().unwrap();
    let mut config = two_category_fixture(dir.path());
    config.description = write_file(
        dir.path(),
        "partial.tsv",
        &["Source_File\tSample_Name\tSample_Replica\tSample_Type", "runA.raw\tS1\tR1\ttumor"],
    );

    let err = combine::run(&config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReferentialIntegrity);
    assert!(!config.output.exists());
}

#[test]
fn test_label_mismatch_is_configuration_error() {
    let paths = vec![PathBuf::from("prio1.a.tsv"), PathBuf::from("prio2.a.tsv")];
    let err: CombineError = InputFile::pair(paths, vec!["only-one".into()]).unwrap_err().into();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_backends_produce_identical_output() {
    let dir = tempdir().unwrap();
    let mut config = two_category_fixture(dir.path());

    config.output = dir.path().join("memory.tsv");
    config.backend = StoreBackend::Memory;
    combine::run(&config).unwrap();

    let memory_output = config.output.clone();
    config.output = dir.path().join("sqlite.tsv");
    config.backend = StoreBackend::Sqlite {
        path: Some(dir.path().join("combined.db")),
    };
    combine::run(&config).unwrap();

    let memory = fs::read_to_string(memory_output).unwrap();
    let sqlite = fs::read_to_string(&config.output).unwrap();
    assert_eq!(memory, sqlite);
    assert!(dir.path().join("combined.db").exists());
}

#[test]
fn test_discover_unfiltered_batch() {
    let dir = tempdir().unwrap();
    let csv_header = HEADER.replace('\t', ",");
    write_file(
        dir.path(),
        "prio3.runA.csv",
        &[&csv_header, "F1,1,80,PEPTIDEK,runA.raw,0.3,false,0.5,HLA-A*02:01,0.5,3,CDS,10"],
    );
    write_file(
        dir.path(),
        "frameshift.runC.csv",
        &[&csv_header, "F2,2,85,PEPTIDEK,runC.raw,0.2,false,0.8,HLA-A*02:01,0.8,4,Frameshift,20"],
    );
    write_file(dir.path(), "notes.txt", &["not a table"]);
    let description = write_file(dir.path(), "samples.tsv", &[DESCRIPTION.trim_end()]);

    let inputs = discover_inputs(dir.path(), "csv").unwrap();
    let labels: Vec<String> = inputs.iter().map(InputFile::resolved_label).collect();
    assert_eq!(labels, vec!["frameshift", "prio3"]);

    let mut config = CombineConfig::new(inputs, description);
    config.loader.delimiter = b',';
    config.resolver.q_threshold = None;
    config.output = dir.path().join("combined.tsv");

    let stats = combine::run(&config).unwrap();
    assert_eq!(stats.peptides_written, 1);

    let rows = read_output(&config.output);
    assert_eq!(rows[0]["Best_Q"], "0.2");
    assert_eq!(rows[0]["Databases_PRISM"], "frameshift,prio3");
    // Roll-ups keep first-seen order, provenance labels are sorted
    assert_eq!(rows[0]["Categories"], "Frameshift,CDS");
    assert_eq!(rows[0]["Samples"], "S2,S1");
}
