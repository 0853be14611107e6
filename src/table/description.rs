use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::warn;

use super::columns::{DESCRIPTION_COLUMNS, SOURCE_FILE};
use super::error::LoaderError;

/// One physical run of the experiment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleEntry {
    /// Source file name (join key)
    pub source_file: String,

    /// Sample the run belongs to
    pub sample_name: String,

    /// Replica identifier within the sample
    pub sample_replica: String,

    /// Sample type / status (e.g. "tumor", "benign")
    pub sample_type: String,
}

impl SampleEntry {
    /// Create a new entry.
    pub fn new(source_file: &str, sample_name: &str, sample_replica: &str, sample_type: &str) -> Self {
        Self {
            source_file: source_file.to_string(),
            sample_name: sample_name.to_string(),
            sample_replica: sample_replica.to_string(),
            sample_type: sample_type.to_string(),
        }
    }
}

/// Sample description table: `Source_File  Sample_Name  Sample_Replica  Sample_Type`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleDescription {
    /// Entries in file order
    pub entries: Vec<SampleEntry>,
}

impl SampleDescription {
    /// Build a description from entries.
    pub fn new(entries: Vec<SampleEntry>) -> Self {
        Self { entries }
    }

    /// Parse the sample description from a tab-delimited file
    pub fn from_tsv_file<P: AsRef<Path>>(path: P) -> Result<Self, LoaderError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoaderError::MissingFile(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|e| LoaderError::io(path, e))?;
        Self::from_reader(BufReader::new(file), path)
    }

    /// Parse the sample description from a reader; `origin` is used in errors
    pub fn from_reader<R: BufRead>(reader: R, origin: &Path) -> Result<Self, LoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .quote(b'"')
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| LoaderError::csv(origin, e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut positions = [0usize; 4];
        for (slot, column) in positions.iter_mut().zip(DESCRIPTION_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| LoaderError::MissingColumn {
                    path: origin.to_path_buf(),
                    column: column.to_string(),
                })?;
        }
        for header in headers.iter().filter(|h| !DESCRIPTION_COLUMNS.contains(&h.as_str())) {
            warn!("Ignoring column '{}' of sample description {}", header, origin.display());
        }

        let mut entries = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| LoaderError::csv(origin, e))?;
            // Skip blank trailing lines
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            let field = |i: usize| record.get(positions[i]).unwrap_or_default().to_string();
            let entry = SampleEntry {
                source_file: field(0),
                sample_name: field(1),
                sample_replica: field(2),
                sample_type: field(3),
            };
            if entry.source_file.is_empty() {
                return Err(LoaderError::EmptyKey {
                    path: origin.to_path_buf(),
                    line: record.position().map(|p| p.line()).unwrap_or_default(),
                    column: SOURCE_FILE.to_string(),
                });
            }
            entries.push(entry);
        }

        Ok(Self { entries })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the description has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
