//! # Validator Module
//!
//! Dry run of a combine configuration: every fatal condition of a real run is
//! checked and reported, but no peptide is resolved and no output is written.
//!
//! ## Checks
//!
//! 1. **Settings**: thresholds and output directory
//! 2. **Sample description**: parseable, unique `Source_File` keys
//! 3. **Identification tables**: readable, consistent column names, required columns
//! 4. **Join coverage**: every `Source_File` of the data described exactly once
//! 5. **Output layout**: allele columns found, no column name clashes
//!
//! ```rust,no_run
//! use prism_combine::combine::CombineConfig;
//! use prism_combine::table::InputFile;
//! use prism_combine::validator::validate_inputs;
//!
//! let config = CombineConfig::new(vec![InputFile::new("prio1.run.csv")], "samples.tsv");
//! let report = validate_inputs(&config);
//! println!("{}", report);
//! ```

mod report;


use std::collections::{BTreeSet, HashMap};

pub use report::{CheckStatus, ValidationCheck, ValidationReport};

use crate::combine::CombineConfig;
use crate::error::ErrorKind;
use crate::output::OutputSchema;
use crate::store::StoreError;
use crate::table::columns::SOURCE_FILE;
use crate::table::{SampleDescription, TableLoader};

/// Check a combine configuration without producing output.
pub fn validate_inputs(config: &CombineConfig) -> ValidationReport {
    let mut report = ValidationReport::new(config.description.display().to_string(), config.inputs.len());

    match config.check() {
        Ok(()) => report.add_check(ValidationCheck::passed("Run settings")),
        Err(e) => report.add_check(ValidationCheck::from_error("Run settings", e)),
    }
    if config.output.exists() {
        report.add_check(ValidationCheck::warning(
            "Output file",
            format!("{} exists and will be replaced", config.output.display()),
        ));
    }

    let description = match SampleDescription::from_tsv_file(&config.description) {
        Ok(description) => description,
        Err(e) => {
            report.add_check(ValidationCheck::from_error("Sample description", e));
            return report;
        }
    };
    let mut described: HashMap<&str, usize> = HashMap::new();
    for entry in &description.entries {
        *described.entry(entry.source_file.as_str()).or_default() += 1;
    }
    let duplicated: BTreeSet<String> = described
        .iter()
        .filter(|(_, &n)| n > 1)
        .map(|(k, _)| k.to_string())
        .collect();
    if duplicated.is_empty() {
        report.add_check(ValidationCheck::passed(format!(
            "Sample description ({} runs)",
            description.len()
        )));
    } else {
        report.add_check(
            ValidationCheck::fatal(
                "Sample description",
                ErrorKind::ReferentialIntegrity,
                format!("{} {} keys listed more than once", duplicated.len(), SOURCE_FILE),
            )
            .with_source_files(duplicated),
        );
    }

    let (table, load) = match TableLoader::new(config.loader.clone()).load(&config.inputs) {
        Ok(loaded) => loaded,
        Err(e) => {
            report.add_check(ValidationCheck::from_error("Identification tables", e));
            return report;
        }
    };
    report.add_check(ValidationCheck::passed(format!(
        "Identification tables ({} files, {} rows, {} columns)",
        load.files,
        load.rows,
        table.columns().len()
    )));
    if load.malformed_dropped > 0 {
        report.add_check(ValidationCheck::warning(
            "Row keys",
            format!("{} rows without Sequence or Source_File will be dropped", load.malformed_dropped),
        ));
    }

    let referenced: BTreeSet<String> = table
        .column_values(SOURCE_FILE)
        .filter(|v| !v.is_null())
        .map(|v| v.to_string())
        .collect();
    let undescribed: Vec<&String> = referenced
        .iter()
        .filter(|s| !described.contains_key(s.as_str()))
        .collect();
    if undescribed.is_empty() {
        report.add_check(ValidationCheck::passed("Join coverage"));
    } else {
        report.add_check(
            ValidationCheck::fatal(
                "Join coverage",
                ErrorKind::ReferentialIntegrity,
                format!("{} source files missing from the sample description", undescribed.len()),
            )
            .with_source_files(undescribed.into_iter().cloned()),
        );
    }
    let unused: BTreeSet<String> = described
        .keys()
        .filter(|k| !referenced.contains(**k))
        .map(|k| k.to_string())
        .collect();
    if !unused.is_empty() {
        report.add_check(
            ValidationCheck::warning(
                "Unused sample description rows",
                format!("no identifications for {} described runs", unused.len()),
            )
            .with_source_files(unused),
        );
    }

    let mut store = match config.backend.open() {
        Ok(store) => store,
        Err(e) => {
            report.add_check(ValidationCheck::from_error("Store", e));
            return report;
        }
    };
    let prepared = store
        .load(table, &description)
        .and_then(|_| store.build_ext_data())
        .and_then(|_| Ok((store.ext_schema()?, store.sample_layout()?)));
    let (ext_schema, layout) = match prepared {
        Ok(prepared) => prepared,
        // Coverage problems are already reported above
        Err(StoreError::ReferentialIntegrity { .. }) if report.has_failures() => return report,
        Err(e) => {
            report.add_check(ValidationCheck::from_error("Store", e));
            return report;
        }
    };
    report.add_check(ValidationCheck::passed(format!("Store ({})", store.backend_name())));

    match OutputSchema::for_ext_schema(&ext_schema, layout) {
        Ok(schema) => {
            if schema.allele_columns().is_empty() {
                report.add_check(ValidationCheck::warning(
                    "Allele columns",
                    "no HLA_A/B/C prediction columns found; Filtered_HLA_allele will be empty",
                ));
            } else {
                report.add_check(ValidationCheck::passed(format!(
                    "Allele columns ({})",
                    schema.allele_columns().len()
                )));
            }
            report.add_check(ValidationCheck::passed(format!("Output layout ({} columns)", schema.len())));
        }
        Err(e) => report.add_check(ValidationCheck::from_error("Output layout", e)),
    }

    report
}
